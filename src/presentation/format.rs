// Terminal rendering of tracking results
use crate::domain::model::{
    OrderDetails, OrderStatus, OtpDispatch, OtpVerification, TrackingSummary,
};
use crate::presentation::theme::Theme;
use chrono::{DateTime, Utc};
use std::fmt::Write;

fn status_text(status: OrderStatus, theme: &Theme, enable_emoji: bool) -> String {
    let icon = match status {
        OrderStatus::Pending | OrderStatus::Confirmed => "🕒",
        OrderStatus::Processing => "🔧",
        OrderStatus::Shipped => "🚚",
        OrderStatus::Delivered => "📦",
        OrderStatus::Cancelled | OrderStatus::Returned => "↩",
        OrderStatus::Unknown => "?",
    };
    let label = status.to_string();
    let styled = match status {
        OrderStatus::Delivered => (theme.done)(&label),
        OrderStatus::Unknown => (theme.failed)(&label),
        s if s.is_final() => (theme.failed)(&label),
        _ => (theme.active)(&label),
    };

    if enable_emoji {
        format!("{} {}", icon, styled)
    } else {
        styled
    }
}

fn date(at: &DateTime<Utc>) -> String {
    at.format("%Y-%m-%d %H:%M UTC").to_string()
}

fn write_summary(output: &mut String, summary: &TrackingSummary, theme: &Theme, emoji: bool) {
    writeln!(
        output,
        "{}  {}",
        (theme.title)(&summary.order_id),
        status_text(summary.status, theme, emoji)
    )
    .ok();

    // No ETA once the order has reached a final state
    let eta = summary
        .estimated_delivery
        .as_ref()
        .filter(|_| !summary.status.is_final())
        .map(date);
    let rows = [
        ("Carrier", summary.carrier.clone()),
        ("Tracking no.", summary.tracking_number.clone()),
        ("Updated", summary.updated_at.as_ref().map(date)),
        ("ETA", eta),
    ];
    for (label, value) in rows {
        if let Some(value) = value {
            writeln!(output, "  {:<13}{}", (theme.label)(label), (theme.value)(&value)).ok();
        }
    }
}

pub fn format_summary(summary: &TrackingSummary, theme: &Theme, enable_emoji: bool) -> String {
    let mut output = String::new();
    write_summary(&mut output, summary, theme, enable_emoji);
    output
}

pub fn format_details(details: &OrderDetails, theme: &Theme, enable_emoji: bool) -> String {
    let mut output = String::new();
    write_summary(&mut output, &details.summary, theme, enable_emoji);

    if let Some(address) = &details.shipping_address {
        writeln!(
            output,
            "  {:<13}{}",
            (theme.label)("Ship to"),
            (theme.value)(address)
        )
        .ok();
    }

    let cutoff = "⸺".repeat(40);
    if !details.items.is_empty() {
        writeln!(output, "  {}", (theme.line)(&cutoff)).ok();
        for (i, item) in details.items.iter().enumerate() {
            let sku = item
                .sku
                .as_deref()
                .map(|s| format!(" [{}]", s))
                .unwrap_or_default();
            writeln!(
                output,
                "  {}. {}{} x{}  {:.2}",
                (theme.idx)(&(i + 1).to_string()),
                (theme.value)(&item.name),
                (theme.note)(&sku),
                item.quantity,
                item.line_total()
            )
            .ok();
        }
        writeln!(
            output,
            "  {:<13}{:.2}",
            (theme.label)("Total"),
            details.total
        )
        .ok();
    }

    if !details.timeline.is_empty() {
        writeln!(output, "  {}", (theme.line)(&cutoff)).ok();
        let prefix = if enable_emoji { "≫" } else { ">" };
        for event in &details.timeline {
            let note = event
                .note
                .as_deref()
                .map(|n| format!("  {}", (theme.note)(n)))
                .unwrap_or_default();
            writeln!(
                output,
                "  {} {}  {}{}",
                prefix,
                date(&event.at),
                status_text(event.status, theme, false),
                note
            )
            .ok();
        }
    }

    output
}

pub fn format_otp_dispatch(dispatch: &OtpDispatch, theme: &Theme) -> String {
    let mut output = String::new();
    writeln!(output, "{}", (theme.done)(&dispatch.message)).ok();
    if let Some(masked) = &dispatch.masked_email {
        writeln!(output, "  {:<13}{}", (theme.label)("Sent to"), (theme.value)(masked)).ok();
    }
    if let Some(secs) = dispatch.expires_in_secs {
        writeln!(output, "  {:<13}{}s", (theme.label)("Expires in"), secs).ok();
    }
    output
}

pub fn format_otp_verification(verification: &OtpVerification, theme: &Theme) -> String {
    let mut output = String::new();
    writeln!(output, "{}", (theme.done)("OTP verified")).ok();
    writeln!(
        output,
        "  {:<13}{}",
        (theme.label)("Access token"),
        (theme.value)(&verification.access_token)
    )
    .ok();
    if let Some(secs) = verification.expires_in_secs {
        writeln!(output, "  {:<13}{}s", (theme.label)("Expires in"), secs).ok();
    }
    output
}
