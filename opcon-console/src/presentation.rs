//! Aggregation presentation
//!
//! Turns the projections fetched from the service into text for the
//! operator: the stats line, the ranked leaderboard, the history table, the
//! library listing and the progress view. Rows are shown in the order the
//! service returned them; nothing here re-sorts.

use opcon_common::human_time::{format_clock_pair, progress_percent};
use opcon_common::models::{HistoryEntry, LeaderboardRow, MediaItem, StatsSnapshot};

pub const EMPTY_STATS: &str = "No stats yet.";
pub const EMPTY_LEADERBOARD: &str = "No data yet.";
pub const HISTORY_NEEDS_OPERATOR: &str = "Register an operator to view history.";
pub const EMPTY_HISTORY: &str = "No sessions for this operator.";
pub const EMPTY_LIBRARY: &str = "No items in library.";

const PROGRESS_BAR_WIDTH: usize = 20;

// ========================================
// Progress
// ========================================

/// Playhead position shown to the operator
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProgressView {
    position: f64,
    duration: f64,
}

impl Default for ProgressView {
    fn default() -> Self {
        Self {
            position: 0.0,
            duration: f64::NAN,
        }
    }
}

impl ProgressView {
    pub fn update(&mut self, position: f64, duration: f64) {
        self.position = position;
        self.duration = duration;
    }

    /// Back to the start, keeping the known duration
    pub fn reset(&mut self) {
        self.position = 0.0;
    }

    pub fn position(&self) -> f64 {
        self.position
    }

    pub fn duration(&self) -> f64 {
        self.duration
    }

    /// 0 when the duration is unknown
    pub fn percent(&self) -> f64 {
        progress_percent(self.position, self.duration)
    }

    /// `mm:ss / mm:ss`
    pub fn label(&self) -> String {
        format_clock_pair(self.position, self.duration)
    }

    pub fn render(&self) -> String {
        let percent = self.percent().clamp(0.0, 100.0);
        let filled = ((percent / 100.0) * PROGRESS_BAR_WIDTH as f64).round() as usize;
        format!(
            "[{}{}] {:5.1}%  {}",
            "#".repeat(filled),
            "-".repeat(PROGRESS_BAR_WIDTH - filled),
            percent,
            self.label()
        )
    }
}

// ========================================
// Leaderboard ranking
// ========================================

/// Leaderboard row with its display rank
#[derive(Debug, Clone, PartialEq)]
pub struct RankedRow<'a> {
    /// 1-based position in service order
    pub rank: usize,
    pub badge: String,
    pub row: &'a LeaderboardRow,
}

/// Medals for the podium, `#n` for everyone else
pub fn rank_badge(rank: usize) -> String {
    match rank {
        1 => "🥇".to_string(),
        2 => "🥈".to_string(),
        3 => "🥉".to_string(),
        n => format!("#{}", n),
    }
}

pub fn rank_rows(rows: &[LeaderboardRow]) -> Vec<RankedRow<'_>> {
    rows.iter()
        .enumerate()
        .map(|(index, row)| RankedRow {
            rank: index + 1,
            badge: rank_badge(index + 1),
            row,
        })
        .collect()
}

// ========================================
// Dashboard
// ========================================

/// Last-fetched projections. `None` means not fetched (or the last fetch
/// failed); views are never served from older data.
#[derive(Debug, Clone, Default)]
pub struct Dashboard {
    pub stats: Option<StatsSnapshot>,
    pub leaders: Option<Vec<LeaderboardRow>>,
    pub history: Option<Vec<HistoryEntry>>,
    pub library: Option<Vec<MediaItem>>,
}

impl Dashboard {
    /// Catalog entry from the last library listing
    pub fn library_item(&self, media_id: i64) -> Option<&MediaItem> {
        self.library.as_ref()?.iter().find(|item| item.id == media_id)
    }
}

/// Plain-text table with left-aligned, padded columns
fn table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let format_row = |cells: Vec<&str>| -> String {
        cells
            .iter()
            .zip(&widths)
            .map(|(cell, width)| format!("{:<width$}", cell, width = *width))
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    };

    let mut lines = Vec::with_capacity(rows.len() + 2);
    lines.push(format_row(headers.to_vec()));
    lines.push(
        widths
            .iter()
            .map(|w| "-".repeat(*w))
            .collect::<Vec<_>>()
            .join("  "),
    );
    for row in rows {
        lines.push(format_row(row.iter().map(String::as_str).collect()));
    }
    lines.join("\n")
}

pub fn render_stats(stats: Option<&StatsSnapshot>) -> String {
    match stats {
        None => EMPTY_STATS.to_string(),
        Some(stats) => format!(
            "Media: {}  Operators: {}  Sessions: {}  Events: {}",
            stats.media_total, stats.operators_total, stats.sessions_total, stats.events_total
        ),
    }
}

pub fn render_leaderboard(rows: &[LeaderboardRow]) -> String {
    if rows.is_empty() {
        return EMPTY_LEADERBOARD.to_string();
    }
    let body: Vec<Vec<String>> = rank_rows(rows)
        .into_iter()
        .map(|ranked| {
            vec![
                ranked.badge,
                ranked.row.name.clone(),
                ranked.row.total_sessions.to_string(),
                ranked.row.completions.to_string(),
                format!("{:.2}", ranked.row.avg_position),
            ]
        })
        .collect();
    table(&["Rank", "Operator", "Sessions", "Completed", "Avg Pos."], &body)
}

/// `history` is `None` while no operator is registered
pub fn render_history(history: Option<&[HistoryEntry]>) -> String {
    let Some(entries) = history else {
        return HISTORY_NEEDS_OPERATOR.to_string();
    };
    if entries.is_empty() {
        return EMPTY_HISTORY.to_string();
    }
    let body: Vec<Vec<String>> = entries
        .iter()
        .map(|entry| {
            vec![
                entry.title.clone(),
                entry.kind.to_string(),
                entry.genre.clone(),
                if entry.completed { "Yes" } else { "No" }.to_string(),
                format!("{:.2}s", entry.last_position),
            ]
        })
        .collect();
    table(&["Title", "Kind", "Genre", "Completed", "Last pos."], &body)
}

pub fn render_library(items: &[MediaItem]) -> String {
    if items.is_empty() {
        return EMPTY_LIBRARY.to_string();
    }
    let body: Vec<Vec<String>> = items
        .iter()
        .map(|item| {
            vec![
                item.id.to_string(),
                item.title.clone(),
                item.kind.to_string(),
                item.genre.clone(),
                format!("{}s", item.duration_seconds),
            ]
        })
        .collect();
    table(&["Id", "Title", "Kind", "Genre", "Duration"], &body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use opcon_common::models::MediaKind;

    fn leader(name: &str, total_sessions: i64) -> LeaderboardRow {
        LeaderboardRow {
            id: 0,
            name: name.to_string(),
            dni: String::new(),
            total_sessions,
            completions: 0,
            avg_position: 0.0,
        }
    }

    #[test]
    fn test_rank_preserves_service_order() {
        // Deliberately not sorted: the service's order is authoritative
        let rows = vec![leader("Zoe", 1), leader("Ana", 5), leader("Bea", 3), leader("Cid", 0)];
        let ranked = rank_rows(&rows);
        let names: Vec<&str> = ranked.iter().map(|r| r.row.name.as_str()).collect();
        assert_eq!(names, vec!["Zoe", "Ana", "Bea", "Cid"]);
        assert_eq!(ranked[0].rank, 1);
        assert_eq!(ranked[3].rank, 4);
    }

    #[test]
    fn test_badges() {
        assert_eq!(rank_badge(1), "🥇");
        assert_eq!(rank_badge(3), "🥉");
        assert_eq!(rank_badge(4), "#4");
        assert_eq!(rank_badge(10), "#10");
    }

    #[test]
    fn test_empty_states() {
        assert_eq!(render_leaderboard(&[]), EMPTY_LEADERBOARD);
        assert_eq!(render_history(None), HISTORY_NEEDS_OPERATOR);
        let none: Vec<HistoryEntry> = Vec::new();
        assert_eq!(render_history(Some(none.as_slice())), EMPTY_HISTORY);
        assert_eq!(render_library(&[]), EMPTY_LIBRARY);
        assert_eq!(render_stats(None), EMPTY_STATS);
        assert_ne!(EMPTY_STATS, EMPTY_LEADERBOARD);
    }

    #[test]
    fn test_history_table() {
        let entries = vec![HistoryEntry {
            id: 1,
            started_at: None,
            ended_at: None,
            title: "Clip".to_string(),
            kind: MediaKind::Video,
            genre: "General".to_string(),
            completed: true,
            last_position: 4.5,
        }];
        let text = render_history(Some(entries.as_slice()));
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("Title"));
        assert!(lines[2].contains("Yes"));
        assert!(lines[2].contains("4.50s"));
    }

    #[test]
    fn test_leaderboard_table_rows_in_order() {
        let rows = vec![leader("Ana", 5), leader("Bea", 3)];
        let text = render_leaderboard(&rows);
        let lines: Vec<&str> = text.lines().collect();
        assert!(lines[2].contains("Ana"));
        assert!(lines[3].contains("Bea"));
    }

    #[test]
    fn test_progress_view() {
        let mut progress = ProgressView::default();
        assert_eq!(progress.percent(), 0.0);
        assert_eq!(progress.label(), "00:00 / 00:00");

        progress.update(25.0, 100.0);
        assert_eq!(progress.percent(), 25.0);
        assert_eq!(progress.label(), "00:25 / 01:40");
        assert!(progress.render().starts_with("[#####---------------]"));

        progress.reset();
        assert_eq!(progress.position(), 0.0);
        assert_eq!(progress.duration(), 100.0);
    }

    #[test]
    fn test_library_lookup() {
        let dashboard = Dashboard {
            library: Some(vec![MediaItem {
                id: 4,
                title: "Clip".to_string(),
                kind: MediaKind::Audio,
                genre: "General".to_string(),
                duration_seconds: 6,
                source_url: "memory://4".to_string(),
                created_at: None,
            }]),
            ..Default::default()
        };
        assert!(dashboard.library_item(4).is_some());
        assert!(dashboard.library_item(5).is_none());
    }
}
