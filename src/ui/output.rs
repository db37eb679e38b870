//! Step-style status lines
//!
//! Interactive terminals get cliclack log lines; everything else gets a
//! bracketed tag so CI logs stay greppable.

use super::context::UiContext;
use console::{style, StyledObject};

#[derive(Debug, Clone, Copy)]
enum Level {
    Ok,
    Warn,
    Fail,
    Info,
}

impl Level {
    fn tag(self) -> StyledObject<&'static str> {
        match self {
            Self::Ok => style("[OK]").green(),
            Self::Warn => style("[WARN]").yellow(),
            Self::Fail => style("[FAIL]").red(),
            Self::Info => style("[INFO]").cyan(),
        }
    }
}

fn emit(ctx: &UiContext, level: Level, line: String) {
    if !ctx.use_fancy_output() {
        println!("  {} {}", level.tag(), line);
        return;
    }

    let shown = match level {
        Level::Ok => cliclack::log::success(&line),
        Level::Warn => cliclack::log::warning(&line),
        Level::Fail => cliclack::log::error(&line),
        Level::Info => cliclack::log::info(&line),
    };
    if shown.is_err() {
        println!("  {} {}", level.tag(), line);
    }
}

/// Bold heading before a block of key/value lines
pub fn section(ctx: &UiContext, title: &str) {
    println!();
    if ctx.use_fancy_output() {
        cliclack::log::info(style(title).bold()).ok();
    } else {
        println!("{}", style(title).bold());
    }
}

pub fn step_ok(ctx: &UiContext, message: &str) {
    emit(ctx, Level::Ok, message.to_string());
}

/// Success line with a dimmed detail, typically a path
pub fn step_ok_detail(ctx: &UiContext, message: &str, detail: &str) {
    emit(ctx, Level::Ok, format!("{} ({})", message, style(detail).dim()));
}

pub fn step_warn(ctx: &UiContext, message: &str) {
    emit(ctx, Level::Warn, message.to_string());
}

/// Warning with a suggestion for what to do next
pub fn step_warn_hint(ctx: &UiContext, message: &str, hint: &str) {
    emit(ctx, Level::Warn, format!("{} - {}", message, style(hint).dim()));
}

pub fn step_error(ctx: &UiContext, message: &str) {
    emit(ctx, Level::Fail, message.to_string());
}

/// Failure line naming the subject and the reason
pub fn step_error_detail(ctx: &UiContext, message: &str, detail: &str) {
    emit(ctx, Level::Fail, format!("{}: {}", message, style(detail).red()));
}

pub fn step_info(ctx: &UiContext, message: &str) {
    emit(ctx, Level::Info, message.to_string());
}

/// Indented `key: value` line
pub fn key_value(ctx: &UiContext, key: &str, value: &str) {
    let key = if ctx.use_fancy_output() {
        style(key).dim()
    } else {
        style(key)
    };
    println!("  {}: {}", key, value);
}
