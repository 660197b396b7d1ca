//! Plain-text reports shared by the CLI, the chat loop and reminders.

use crate::models::{CheckKind, Counter, DayRecord, Goals, StatisticsReport};
use crate::tracker::{heatmap_symbols, score_day, DimensionSet, Outstanding};
use crate::utils::clock::Clock;
use crate::utils::format::{format_amount, format_average, mark, progress_bar};

pub fn title(clock: &Clock, campaign_name: &str) -> String {
    match clock.campaign_day() {
        Some(day) => format!("🌙 {} — day {}", campaign_name, day),
        None => format!("🌙 Today — {}", clock.today_key()),
    }
}

pub fn today_report(
    record: &DayRecord,
    goals: &Goals,
    dims: &DimensionSet,
    title: &str,
) -> String {
    let score = score_day(record, goals, dims);
    let mut lines = vec![title.to_string(), String::new()];

    for (check, done) in dims.checks().iter().zip(&score.checks) {
        let line = match check {
            CheckKind::Goal(counter) => format!(
                "{} {}: {} {} (goal {})",
                counter.icon(),
                counter.display_name(),
                format_amount(*counter, record.counter(*counter) as u64),
                mark(*done),
                format_amount(*counter, goals.get(*counter) as u64),
            ),
            CheckKind::Mosque => format!(
                "🕌 Mosque: {}/5 {} {}",
                record.mosque_count(),
                progress_bar(record.mosque_count(), 5, 10),
                mark(*done)
            ),
            CheckKind::Flag(flag) => {
                format!("{} {}: {}", flag.icon(), flag.display_name(), mark(*done))
            }
        };
        lines.push(line);
    }

    lines.push(String::new());
    lines.push(format!(
        "⭐ Completed: {}/{} {}",
        score.completed,
        dims.total_checks(),
        score.heat.symbol()
    ));
    lines.join("\n")
}

pub fn statistics_report(report: &StatisticsReport, goals: &Goals, window: usize) -> String {
    let total = report.total_checks;
    let days = report.total_days;
    let mut lines = vec![
        format!("📊 Statistics (days tracked: {})", days),
        String::new(),
        format!(
            "🔥 Streak: {} | Best streak: {}",
            report.streak.current, report.streak.best
        ),
        format!("✅ Perfect days ({}/{}): {}", total, total, report.perfect_days),
        format!("⭐ Average completion: {:.1}/{}", report.average_completion, total),
        format!(
            "🏆 Best day: {} ({}/{})",
            report.best_day.date, report.best_day.completed, total
        ),
        String::new(),
        format!("🗓 Last {} days: {}", window, heatmap_symbols(&report.heatmap)),
        String::new(),
        "— Totals —".to_string(),
    ];

    for c in &report.counters {
        lines.push(format!(
            "{} {}: {} (avg {}/day)",
            c.counter.icon(),
            c.counter.display_name(),
            format_amount(c.counter, c.total),
            format_average(c.counter, c.per_day)
        ));
        if c.counter == Counter::QuranPages {
            lines.push(format!(
                "🕌 Mosque: {} prayers of {} (avg {:.1}/day)",
                report.mosque_prayers,
                report.mosque_possible(),
                report.mosque_per_day
            ));
            for f in &report.flag_days {
                lines.push(format!(
                    "{} {}: {} days",
                    f.flag.icon(),
                    f.flag.display_name(),
                    f.days
                ));
            }
        }
    }

    lines.push(String::new());
    lines.push("— Goals reached (days) —".to_string());
    for hit in &report.goal_hits {
        let label = match hit.check {
            CheckKind::Goal(counter) => format!(
                "{} {} ≥{}",
                counter.icon(),
                counter.display_name(),
                goals.get(counter)
            ),
            other => format!("{} {}", other.icon(), other.display_name()),
        };
        lines.push(format!("{}: {}/{}", label, hit.hits, days));
    }
    lines.join("\n")
}

pub fn remaining_report(outstanding: &[Outstanding]) -> String {
    if outstanding.is_empty() {
        return "✅ Every goal for today is met.".to_string();
    }
    outstanding
        .iter()
        .map(|o| match o {
            Outstanding::Counter { counter, left } => format!(
                "{} {}: {} left",
                counter.icon(),
                counter.display_name(),
                format_amount(*counter, *left as u64)
            ),
            Outstanding::Flag(flag) => {
                format!("{} {}: not marked", flag.icon(), flag.display_name())
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn goals_summary(goals: &Goals) -> String {
    Counter::ALL
        .iter()
        .map(|c| {
            format!(
                "{} {}: {}",
                c.icon(),
                c.display_name(),
                format_amount(*c, goals.get(*c) as u64)
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}
