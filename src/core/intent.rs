use crate::domain::chat::{ChatMessage, ChatRequest, ToolChoice, ToolDefinition};
use crate::domain::model::PurchaseIntent;
use crate::domain::ports::{ChatClient, Prompter};
use crate::utils::error::{Result, ShopperError};
use chrono::{Datelike, Duration, Months, NaiveDate};
use regex::Regex;
use serde_json::{json, Value};
use std::sync::OnceLock;

pub const EXTRACT_INTENT_TOOL: &str = "extract_intent";

const UNSET_TIMEFRAMES: [&str; 3] = ["unspecified", "unknown", "n/a"];

/// Function parameters for `extract_intent`. Every property carries a single plain type.
pub fn intent_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "product": {
                "type": "string",
                "description": "Desired product or service"
            },
            "timeframe": {
                "type": "string",
                "description": "When they want to buy"
            },
            "desired_price": {
                "type": "string",
                "description": "Target or max price"
            },
            "location": {
                "type": "string",
                "description": "Physical or online region"
            },
            "provide_financials": {
                "type": "boolean",
                "description": "Whether they will upload data"
            }
        },
        "required": ["product", "timeframe", "provide_financials"]
    })
}

/// Extracts a `PurchaseIntent` from free text with a forced function call.
pub async fn parse_intent(
    client: &dyn ChatClient,
    model: &str,
    user_text: &str,
) -> Result<PurchaseIntent> {
    let request = ChatRequest::new(
        model,
        vec![
            ChatMessage::system("You extract structured purchase intents."),
            ChatMessage::user(user_text),
        ],
    )
    .with_tools(
        vec![ToolDefinition::function(
            EXTRACT_INTENT_TOOL,
            "Extract key fields about a purchase request",
            intent_schema(),
        )],
        ToolChoice::Function(EXTRACT_INTENT_TOOL.to_string()),
    );

    let message = client.complete(request).await?;
    let call = message.tool_calls().first().ok_or(ShopperError::NoToolCall)?;
    tracing::debug!("🧩 Intent arguments: {}", call.function.arguments);

    let intent: PurchaseIntent = serde_json::from_str(&call.function.arguments)?;
    Ok(intent)
}

fn timeframe_unset(timeframe: &str) -> bool {
    let tf = timeframe.trim();
    tf.is_empty() || UNSET_TIMEFRAMES.contains(&tf.to_ascii_lowercase().as_str())
}

/// Asks for whatever the model left out. Financials consent is always confirmed.
pub fn ask_missing(mut intent: PurchaseIntent, prompter: &mut dyn Prompter) -> Result<PurchaseIntent> {
    if intent.product.trim().is_empty() {
        intent.product = prompter.ask("What are you looking to buy?", None)?;
    }
    if timeframe_unset(&intent.timeframe) {
        intent.timeframe =
            prompter.ask("When would you like to buy it by? (e.g. 'in 3 months')", None)?;
    }

    if intent.desired_price.as_deref().map_or(true, |p| p.trim().is_empty()) {
        let budget = prompter.ask("What's your budget (or leave blank)?", Some(""))?;
        intent.desired_price = Some(budget).filter(|b| !b.trim().is_empty());
    }
    if intent.location.as_deref().map_or(true, |l| l.trim().is_empty()) {
        intent.location = Some(prompter.ask("Buying online or in-store? Which country/region?", None)?);
    }

    intent.provide_financials =
        prompter.confirm("Would you like to upload your financial spreadsheet?")?;

    Ok(intent)
}

struct TimeframePatterns {
    relative: Regex,
    next_unit: Regex,
    end_of: Regex,
    month_first: Regex,
    day_first: Regex,
}

fn patterns() -> &'static TimeframePatterns {
    static PATTERNS: OnceLock<TimeframePatterns> = OnceLock::new();
    PATTERNS.get_or_init(|| TimeframePatterns {
        relative: Regex::new(
            r"^(?:(?:in|within|after|over)\s+)?(?:the\s+)?(?:next\s+)?(\d+|a couple of|a few|an?|one|two|three|four|five|six|seven|eight|nine|ten|eleven|twelve)\s+(day|week|month|year)s?(?:\s+from\s+(?:now|today))?$",
        )
        .expect("relative pattern is valid"),
        next_unit: Regex::new(r"^next\s+(week|month|year)$").expect("next pattern is valid"),
        end_of: Regex::new(r"^(?:the\s+)?end\s+of\s+(?:the\s+|this\s+)?(month|year)$")
            .expect("end-of pattern is valid"),
        month_first: Regex::new(r"^([a-z]+)\.?(?:\s+(\d{1,2})(?:st|nd|rd|th)?)?(?:,?\s+(\d{4}))?$")
            .expect("month-first pattern is valid"),
        day_first: Regex::new(r"^(\d{1,2})(?:st|nd|rd|th)?\s+(?:of\s+)?([a-z]+)\.?(?:,?\s+(\d{4}))?$")
            .expect("day-first pattern is valid"),
    })
}

fn number_word(word: &str) -> Option<u32> {
    Some(match word {
        "a" | "an" | "one" => 1,
        "two" | "a couple of" => 2,
        "three" | "a few" => 3,
        "four" => 4,
        "five" => 5,
        "six" => 6,
        "seven" => 7,
        "eight" => 8,
        "nine" => 9,
        "ten" => 10,
        "eleven" => 11,
        "twelve" => 12,
        digits => digits.parse().ok()?,
    })
}

fn month_number(name: &str) -> Option<u32> {
    const MONTHS: [&str; 12] = [
        "january", "february", "march", "april", "may", "june", "july", "august", "september",
        "october", "november", "december",
    ];
    if name.len() < 3 {
        return None;
    }
    MONTHS
        .iter()
        .position(|m| m.starts_with(name))
        .map(|idx| idx as u32 + 1)
}

fn add_units(today: NaiveDate, amount: u32, unit: &str) -> Option<NaiveDate> {
    match unit {
        "day" => today.checked_add_signed(Duration::days(amount as i64)),
        "week" => today.checked_add_signed(Duration::weeks(amount as i64)),
        "month" => today.checked_add_months(Months::new(amount)),
        "year" => today.checked_add_months(amount.checked_mul(12).map(Months::new)?),
        _ => None,
    }
}

fn last_day_of_month(year: i32, month: u32) -> Option<NaiveDate> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    first.checked_add_months(Months::new(1))?.pred_opt()
}

/// Builds a date from month/day/year parts. A missing day takes today's day of month;
/// a missing year picks the next occurrence on or after `today`.
fn calendar_date(today: NaiveDate, month: u32, day: Option<u32>, year: Option<i32>) -> Option<NaiveDate> {
    let build = |y: i32| {
        let last = last_day_of_month(y, month)?.day();
        match day {
            Some(d) if d > last => None,
            Some(d) => NaiveDate::from_ymd_opt(y, month, d),
            None => NaiveDate::from_ymd_opt(y, month, today.day().min(last)),
        }
    };

    match year {
        Some(y) => build(y),
        // Feb 29 may be up to eight years out.
        None => (today.year()..=today.year() + 8)
            .filter_map(build)
            .find(|candidate| *candidate >= today),
    }
}

/// Resolves a human timeframe to a calendar date, preferring future dates.
pub fn resolve_timeframe(text: &str, today: NaiveDate) -> Option<NaiveDate> {
    let mut normalized = text.trim().trim_end_matches('.').to_ascii_lowercase();
    for prefix in ["by ", "before ", "on ", "around ", "until "] {
        if let Some(rest) = normalized.strip_prefix(prefix) {
            normalized = rest.trim().to_string();
        }
    }
    let s = normalized.as_str();

    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Some(date);
    }
    if let Ok(date) = NaiveDate::parse_from_str(s, "%m/%d/%Y") {
        return Some(date);
    }

    match s {
        "today" | "now" | "tonight" => return Some(today),
        "tomorrow" => return today.succ_opt(),
        _ => {}
    }

    let p = patterns();

    if let Some(caps) = p.relative.captures(s) {
        let amount = number_word(&caps[1])?;
        return add_units(today, amount, &caps[2]);
    }
    if let Some(caps) = p.next_unit.captures(s) {
        return add_units(today, 1, &caps[1]);
    }
    if let Some(caps) = p.end_of.captures(s) {
        return match &caps[1] {
            "month" => last_day_of_month(today.year(), today.month()),
            _ => NaiveDate::from_ymd_opt(today.year(), 12, 31),
        };
    }
    if let Some(caps) = p.month_first.captures(s) {
        if let Some(month) = month_number(&caps[1]) {
            let day = caps.get(2).and_then(|m| m.as_str().parse().ok());
            let year = caps.get(3).and_then(|m| m.as_str().parse().ok());
            return calendar_date(today, month, day, year);
        }
    }
    if let Some(caps) = p.day_first.captures(s) {
        if let Some(month) = month_number(&caps[2]) {
            let day = caps[1].parse().ok();
            let year = caps.get(3).and_then(|m| m.as_str().parse().ok());
            return calendar_date(today, month, day, year);
        }
    }

    None
}

/// `YYYY-MM-DD` when the timeframe resolves, otherwise the text unchanged.
pub fn parse_timeframe_to_date(text: &str, today: NaiveDate) -> String {
    match resolve_timeframe(text, today) {
        Some(date) => date.format("%Y-%m-%d").to_string(),
        None => {
            tracing::debug!("🗓️ Could not resolve timeframe '{}', keeping it as written", text);
            text.to_string()
        }
    }
}

/// Block shown before the confirmation prompt. The financials line appears only with a path.
pub fn render_summary(intent: &PurchaseIntent, financials_path: Option<&str>) -> Result<String> {
    let mut summary = format!("\n--- Summary ---\n{}", serde_json::to_string_pretty(intent)?);
    if let Some(path) = financials_path {
        summary.push_str(&format!("\nFinancials path: {}", path));
    }
    Ok(summary)
}
