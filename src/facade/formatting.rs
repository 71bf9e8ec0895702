// src/facade/formatting.rs - Presentation strings for club and match data

use super::Fixture;
use crate::constants::money::RAW_UNITS_PER_DOLLAR;

/// Groups the digits of `value` by thousands with commas: `-1234567` → `-1,234,567`.
pub fn group_thousands(value: i64) -> String {
    let digits = value.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if value < 0 {
        grouped.push('-');
    }
    for (i, digit) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }
    grouped
}

/// Formats a raw in-game amount as dollars.
///
/// Raw amounts are in 1/10000 of a dollar and are rounded up to whole
/// dollars before being abbreviated with `K$`, `M$` or `B$`.
///
/// # Examples
/// ```
/// use soccerverse_bot::facade::formatting::format_money;
///
/// assert_eq!(format_money(0), "0$");
/// assert_eq!(format_money(15_000_000), "1.5K$");
/// assert_eq!(format_money(25_000_000_000), "2.5M$");
/// ```
pub fn format_money(amount: i64) -> String {
    if amount == 0 {
        return "0$".to_string();
    }

    let dollars = (amount as f64 / RAW_UNITS_PER_DOLLAR).ceil();
    if dollars >= 1_000_000_000.0 {
        format!("{:.1}B$", dollars / 1_000_000_000.0)
    } else if dollars >= 1_000_000.0 {
        format!("{:.1}M$", dollars / 1_000_000.0)
    } else if dollars >= 1_000.0 {
        format!("{:.1}K$", dollars / 1_000.0)
    } else {
        format!("{}$", group_thousands(dollars as i64))
    }
}

/// Relative change from `start` to `current`, one decimal.
pub fn format_percentage_change(current: f64, start: f64) -> String {
    if start == 0.0 {
        return "N/A".to_string();
    }

    let change = (current - start) / start * 100.0;
    if change > 0.0 {
        format!("+{change:.1}%")
    } else if change < 0.0 {
        format!("{change:.1}%")
    } else {
        "0%".to_string()
    }
}

fn format_count_change(current: i64, start: i64) -> String {
    if start == 0 {
        return String::new();
    }

    let diff = current - start;
    match diff.signum() {
        1 => format!("(+{})", group_thousands(diff)),
        -1 => format!("({})", group_thousands(diff)),
        _ => "(=)".to_string(),
    }
}

/// Fan count delta since season start, empty when the start is unknown
pub fn format_fans_change(current: i64, start: i64) -> String {
    format_count_change(current, start)
}

/// Stadium capacity delta since season start, empty when the start is unknown
pub fn format_capacity_change(current: i64, start: i64) -> String {
    format_count_change(current, start)
}

/// Flag and French name for a game country code.
pub fn format_country_name(country_code: &str) -> String {
    match country_code {
        "CHE" => "🇨🇭 Suisse".to_string(),
        "FRA" => "🇫🇷 France".to_string(),
        "ENG" => "\u{1F3F4}\u{E0067}\u{E0062}\u{E0065}\u{E006E}\u{E0067}\u{E007F} Angleterre"
            .to_string(),
        "ESP" => "🇪🇸 Espagne".to_string(),
        "ITA" => "🇮🇹 Italie".to_string(),
        "GER" => "🇩🇪 Allemagne".to_string(),
        "BRA" => "🇧🇷 Brésil".to_string(),
        "ARG" => "🇦🇷 Argentine".to_string(),
        "USA" => "🇺🇸 États-Unis".to_string(),
        "CAN" => "🇨🇦 Canada".to_string(),
        "MEX" => "🇲🇽 Mexique".to_string(),
        "NED" => "🇳🇱 Pays-Bas".to_string(),
        "BEL" => "🇧🇪 Belgique".to_string(),
        "POR" => "🇵🇹 Portugal".to_string(),
        "ALB" => "🇦🇱 Albanie".to_string(),
        "AFR" => "🌍 Afrique".to_string(),
        _ => format!("🌍 {country_code}"),
    }
}

/// One glyph per result letter, oldest first
pub fn format_form(form: &str) -> String {
    if form.is_empty() {
        return "Aucune".to_string();
    }

    form.chars()
        .map(|result| match result {
            'W' => '🟢',
            'D' => '🟡',
            'L' => '🔴',
            _ => '⚪',
        })
        .collect()
}

pub fn competition_type(comp_type: i64) -> &'static str {
    match comp_type {
        0 => "🏆 Championnat",
        1 => "🏅 Coupe",
        _ => "⚽ Match",
    }
}

/// Win/draw/loss marker of a fixture from `club_id`'s side, or the
/// upcoming marker when it has not been played.
pub fn match_outcome(fixture: &Fixture, club_id: i64) -> &'static str {
    if !fixture.is_played() {
        return "⏳ À venir";
    }

    let (club_goals, opponent_goals) = if fixture.home_club == club_id {
        (fixture.home_goals, fixture.away_goals)
    } else {
        (fixture.away_goals, fixture.home_goals)
    };
    match club_goals.cmp(&opponent_goals) {
        std::cmp::Ordering::Greater => "🟢 V",
        std::cmp::Ordering::Less => "🔴 D",
        std::cmp::Ordering::Equal => "🟡 N",
    }
}
