//! Embed rendering for panels and whitelist results

use rankboard::domain::{HIERARCHY_PANEL_TITLE, NO_MEMBERS, STATUS_PANEL_TITLE};
use rankboard::{HierarchyPanel, PanelBody, PanelSection, StatusReport, WhitelistApplication};
use serenity::builder::{CreateEmbed, CreateEmbedFooter};
use serenity::model::{Colour, Timestamp};
use std::fmt::Write;

/// Discord caps embeds at 25 fields
const MAX_FIELDS: usize = 25;
/// Discord caps embed field names at 256 characters
const MAX_FIELD_NAME: usize = 256;
/// Discord caps embed field values at 1024 characters
const MAX_FIELD_VALUE: usize = 1024;
/// Discord caps the combined text of one embed at 6000 characters
const MAX_EMBED_TOTAL: usize = 6000;
/// Room kept for the "… and N more" tail
const TAIL_RESERVE: usize = 32;
/// Room kept for the trailing "N more roles not shown" field
const SUMMARY_RESERVE: usize = 48;
/// Sections are not started with less room than this
const MIN_FIELD_VALUE: usize = 64;

const FOOTER: &str = "Última atualização";

/// Render any panel body
pub fn panel_embed(body: &PanelBody) -> CreateEmbed {
    match body {
        PanelBody::Hierarchy(panel) => hierarchy_embed(panel),
        PanelBody::Status(report) => status_embed(report),
    }
}

/// Hierarchy panel: one field per role section, in priority order.
///
/// Sections that no longer fit the embed limits are folded into a final
/// summary field.
pub fn hierarchy_embed(panel: &HierarchyPanel) -> CreateEmbed {
    let footer = format!("{} membros listados · {}", panel.member_count(), FOOTER);
    let mut budget = MAX_EMBED_TOTAL
        - width(HIERARCHY_PANEL_TITLE)
        - width(&footer)
        - SUMMARY_RESERVE;

    let mut embed = CreateEmbed::new()
        .title(HIERARCHY_PANEL_TITLE)
        .colour(Colour::GOLD)
        .footer(CreateEmbedFooter::new(footer))
        .timestamp(Timestamp::now());

    let limit = if panel.sections.len() > MAX_FIELDS {
        MAX_FIELDS - 1
    } else {
        panel.sections.len()
    };

    let mut shown = 0;
    for section in &panel.sections[..limit] {
        let name = field_name(&section.heading);
        let room = budget.saturating_sub(width(&name)).min(MAX_FIELD_VALUE);
        if room < MIN_FIELD_VALUE {
            break;
        }

        let value = section_value(section, room);
        budget -= width(&name) + width(&value);
        embed = embed.field(name, value, false);
        shown += 1;
    }

    let hidden = panel.sections.len() - shown;
    if hidden > 0 {
        embed = embed.field("…", format!("{hidden} more roles not shown"), false);
    }

    embed
}

fn width(s: &str) -> usize {
    s.chars().count()
}

fn field_name(heading: &str) -> String {
    if width(heading) <= MAX_FIELD_NAME {
        return heading.to_string();
    }
    let mut name: String = heading.chars().take(MAX_FIELD_NAME - 1).collect();
    name.push('…');
    name
}

/// Member mentions of a section, at most `cap` characters
fn section_value(section: &PanelSection, cap: usize) -> String {
    if section.is_empty() {
        return NO_MEMBERS.to_string();
    }

    let lines: Vec<String> = section.members.iter().map(|m| format!("<@{m}>")).collect();
    let joined = lines.join("\n");
    if width(&joined) <= cap {
        return joined;
    }

    let mut value = String::new();
    let mut listed = 0;
    for line in &lines {
        if width(&value) + width(line) + 1 > cap - TAIL_RESERVE {
            break;
        }
        if !value.is_empty() {
            value.push('\n');
        }
        value.push_str(line);
        listed += 1;
    }
    if !value.is_empty() {
        value.push('\n');
    }
    let _ = write!(value, "… and {} more", lines.len() - listed);
    value
}

/// Status panel
pub fn status_embed(report: &StatusReport) -> CreateEmbed {
    let mut embed = CreateEmbed::new()
        .title(STATUS_PANEL_TITLE)
        .colour(Colour::BLUE)
        .field(
            "🟢 Online há",
            format!("<t:{}:R>", report.started_at.timestamp()),
            true,
        )
        .field("📡 Ping", ping(report.latency_ms), true)
        .field("🌎 Servidores", report.guild_count.to_string(), true)
        .field("📋 Whitelists", report.whitelist_count.to_string(), true)
        .footer(CreateEmbedFooter::new(FOOTER));

    if let Ok(ts) = Timestamp::from_unix_timestamp(report.updated_at.timestamp()) {
        embed = embed.timestamp(ts);
    }

    embed
}

fn ping(latency_ms: Option<u64>) -> String {
    match latency_ms {
        Some(ms) => format!("{ms}ms"),
        None => "indisponível".to_string(),
    }
}

/// Result posted after a whitelist form is submitted
pub fn whitelist_result_embed(app: &WhitelistApplication, avatar_url: Option<String>) -> CreateEmbed {
    let mut embed = CreateEmbed::new()
        .title("✅ Whitelist Aprovada!")
        .colour(Colour::DARK_GREEN)
        .field("👤 Nome", app.name.clone(), true)
        .field("🆔 ID", app.game_id.clone(), true)
        .field("📜 Recrutador", app.recruiter_name.clone(), true)
        .field("🔑 ID do Recrutador", app.recruiter_id.clone(), true)
        .field("Usuário", format!("<@{}>", app.user_id), false);

    if let Some(url) = avatar_url {
        embed = embed.thumbnail(url);
    }
    if let Ok(ts) = Timestamp::from_unix_timestamp(app.submitted_at.timestamp()) {
        embed = embed.timestamp(ts);
    }

    embed
}
