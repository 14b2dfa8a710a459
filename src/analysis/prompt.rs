//! Prompt construction — pure functions from chart, event history, and
//! horizon to the final instruction text.

use chrono::{DateTime, Datelike, Duration, Utc};

use crate::analysis::types::AnalysisKind;
use crate::chart::ChartSnapshot;
use crate::events::EventRecord;

/// Maximum number of events included in the prompt.
const MAX_PROMPT_EVENTS: usize = 20;

/// Render the chart as plain text: one line per planet, one per aspect.
pub fn chart_summary(chart: &ChartSnapshot) -> String {
    let mut lines = Vec::new();

    lines.push("## Planet positions".to_string());
    for p in &chart.planets {
        lines.push(format!(
            "- {}: {} {:.1}° (house {})",
            p.planet, p.sign, p.sign_degree, p.house
        ));
    }

    if !chart.aspects.is_empty() {
        lines.push(String::new());
        lines.push("## Major aspects".to_string());
        for a in &chart.aspects {
            lines.push(format!(
                "- {} {} {} (orb {:.1}°)",
                a.a, a.aspect, a.b, a.orb
            ));
        }
    }

    lines.join("\n")
}

/// Render up to the 20 most recent events as a numbered plain-text list.
/// Returns an empty string when there is no history.
pub fn events_summary(events: &[EventRecord]) -> String {
    if events.is_empty() {
        return String::new();
    }

    let mut lines = vec!["## Life record summary".to_string(), String::new()];
    for (idx, event) in events.iter().take(MAX_PROMPT_EVENTS).enumerate() {
        let mut line = format!(
            "{}. {} — {}",
            idx + 1,
            event.date.format("%Y-%m-%d"),
            event.title
        );
        if !event.description.is_empty() {
            line.push_str(": ");
            line.push_str(&event.description);
        }
        lines.push(line);
    }
    lines.join("\n")
}

/// The horizon-specific instruction block: analytical emphasis plus the date
/// range expected for key nodes, anchored to the current date.
pub fn horizon_instructions(kind: AnalysisKind, now: DateTime<Utc>) -> String {
    let today = now.format("%Y-%m-%d");
    match kind {
        AnalysisKind::Past => format!(
            "Based on the current date ({today}), look back over past planetary \
             cycles and the life records, and analyze how the past shaped the \
             present. Focus on:\n\
             - significant past planetary cycles (Saturn return, Jupiter cycles)\n\
             - the growth arc visible in the life records\n\
             - how past experiences formed who the person is now\n\
             - lessons worth carrying forward\n\
             Key node dates must be significant dates in the past."
        ),
        AnalysisKind::Next7Days => {
            let week_end = (now + Duration::days(7)).format("%Y-%m-%d");
            format!(
                "Based on the current date ({today}), generate a forecast for the \
                 next 7 days (through {week_end}). Focus on:\n\
                 - the main planetary movements over the coming week\n\
                 - how transiting planets touch the natal chart\n\
                 - key timing windows to watch\n\
                 - the week's energy trend and opportunities\n\
                 Key node dates must fall within the next 7 days."
            )
        }
        AnalysisKind::Monthly => format!(
            "Based on the current date ({today}), analyze the overall outlook for \
             the current month ({:04}-{:02}). Focus on:\n\
             - the month's main planetary cycles\n\
             - shifting energies across the houses this month\n\
             - the month's key timing windows\n\
             - the month's overall themes\n\
             Key node dates must fall within the current month.",
            now.year(),
            now.month()
        ),
        AnalysisKind::Yearly => format!(
            "Based on the current date ({today}), analyze the outlook for the \
             current year ({:04}). Focus on:\n\
             - the year's significant planetary cycles (Jupiter, Saturn)\n\
             - the energy themes of each life area over the year\n\
             - the year's turning points\n\
             - the year's overall trend, opportunities, and challenges\n\
             Key node dates must be significant dates within the current year.",
            now.year()
        ),
    }
}

/// Compose the full prompt: persona framing, chart and event summaries, the
/// horizon block, and the strict JSON output contract.
pub fn build_prompt(
    chart: &ChartSnapshot,
    events: &[EventRecord],
    kind: AnalysisKind,
    now: DateTime<Utc>,
) -> String {
    let chart_text = chart_summary(chart);
    let events_text = events_summary(events);
    let horizon = horizon_instructions(kind, now);

    let mut prompt = String::new();
    prompt.push_str(
        "You are a seasoned astrologer with twenty years of chart-reading \
         experience. Analyze the following natal chart in depth, drawing on \
         the person's life records where available.\n\n",
    );
    prompt.push_str(&chart_text);
    if !events_text.is_empty() {
        prompt.push_str("\n\n");
        prompt.push_str(&events_text);
    }
    prompt.push_str("\n\n");
    prompt.push_str(&horizon);
    prompt.push_str(
        "\n\nOutput requirements:\n\
         1. Respond with a single strict JSON object and nothing else — no \
         prose outside the JSON, no markdown.\n\
         2. The JSON must have exactly this structure:\n\
         {\n\
           \"futureGuidance\": {\"paragraph1\": \"...\", \"paragraph2\": \"...\"},\n\
           \"spiritualityIndex\": 78,\n\
           \"career\": {\"title\": \"Career\", \"content\": \"...\"},\n\
           \"emotion\": {\"title\": \"Emotion\", \"content\": \"...\"},\n\
           \"energy\": {\"title\": \"Energy\", \"content\": \"...\"},\n\
           \"keyNodes\": [{\"date\": \"YYYY-MM-DD\", \"description\": \"...\"}]\n\
         }\n\
         3. Provide 3-5 keyNodes with dates in the range the horizon above \
         requires, formatted YYYY-MM-DD.\n\
         4. spiritualityIndex is an integer from 0 to 100 grounded in the \
         chart's spiritual signatures (12th house, Neptune themes, Pisces \
         placements).\n\
         5. Ground every section in specific placements, houses, and aspects \
         from the chart, in accessible astrological language.\n",
    );
    prompt
}
