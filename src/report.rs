use std::io::{self, Write};

use unicode_width::UnicodeWidthStr;

use crate::models::{CompanyInfo, Suggestion};

/// Human-readable company summary printed by `Ticker::info`.
pub fn write_company<W: Write>(out: &mut W, info: &CompanyInfo) -> io::Result<()> {
    match &info.nse_code {
        Some(code) => writeln!(out, "{} ({code})", info.name)?,
        None => writeln!(out, "{}", info.name)?,
    }

    let fields = [
        ("Short name", info.short_name.as_deref()),
        ("Sector", info.sector.as_deref()),
        ("Industry", info.industry.as_deref()),
        ("ISIN", info.isin.as_deref()),
        ("BSE code", info.bse_code.as_deref()),
        ("Company id", info.company_id.as_deref()),
    ];
    let present: Vec<(&str, &str)> = fields
        .iter()
        .filter_map(|(label, value)| value.map(|value| (*label, value)))
        .collect();
    write_aligned(out, &present)?;

    if !info.ratios.is_empty() {
        writeln!(out, "  Key ratios:")?;
        let ratios: Vec<(&str, String)> = info
            .ratios
            .iter()
            .map(|(name, value)| (name.as_str(), format!("{value:.2}")))
            .collect();
        let label_width = ratios
            .iter()
            .map(|(name, _)| UnicodeWidthStr::width(*name))
            .max()
            .unwrap_or(0);
        for (name, value) in &ratios {
            let pad = label_width.saturating_sub(UnicodeWidthStr::width(*name));
            writeln!(out, "    {name}{}  {value}", " ".repeat(pad))?;
        }
    }
    Ok(())
}

pub fn write_suggestions<W: Write>(
    out: &mut W,
    symbol: &str,
    suggestions: &[Suggestion],
) -> io::Result<()> {
    if suggestions.is_empty() {
        return writeln!(out, "No matches found for '{symbol}'. Please check the NSE symbol.");
    }
    writeln!(out, "Suggestions for '{symbol}':")?;
    for suggestion in suggestions {
        writeln!(out, "  {suggestion}")?;
    }
    Ok(())
}

fn write_aligned<W: Write>(out: &mut W, rows: &[(&str, &str)]) -> io::Result<()> {
    let label_width = rows
        .iter()
        .map(|(label, _)| UnicodeWidthStr::width(*label))
        .max()
        .unwrap_or(0);
    for (label, value) in rows {
        let pad = label_width.saturating_sub(UnicodeWidthStr::width(*label));
        writeln!(out, "  {label}:{} {value}", " ".repeat(pad))?;
    }
    Ok(())
}
