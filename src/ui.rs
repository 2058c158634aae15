use colored::Colorize;
use declarative::{ApplyResult, ResourceDiff, ResourceState};

/// Print an info message
pub fn info(msg: &str) {
    println!("{} {}", "ℹ".blue(), msg);
}

/// Print a success message
pub fn success(msg: &str) {
    println!("{} {}", "✓".green(), msg);
}

/// Print a warning message
pub fn warn(msg: &str) {
    println!("{} {}", "⚠".yellow(), msg);
}

/// Print an error message
pub fn error(msg: &str) {
    eprintln!("{} {}", "✗".red(), msg);
}

/// Print a dim/muted message
pub fn dim(msg: &str) {
    println!("  {}", msg.dimmed());
}

/// Print a header/title
pub fn header(title: &str) {
    println!();
    println!("{}", title.bold());
    println!("{}", "─".repeat(title.chars().count()).dimmed());
}

/// Print a section header
pub fn section(title: &str) {
    println!();
    println!("{}", title.cyan().bold());
}

/// Print a key-value pair
pub fn kv(key: &str, value: &str) {
    println!("  {}: {}", key.dimmed(), value);
}

/// One-character marker for an apply result
pub fn result_symbol(result: &ApplyResult) -> &'static str {
    match result {
        ApplyResult::NoChange => "○",
        ApplyResult::Created | ApplyResult::Modified | ApplyResult::Removed => "✓",
        ApplyResult::Failed { .. } => "✗",
        ApplyResult::Skipped { .. } => "⊘",
    }
}

/// Diff marker: `+` create, `-` remove, `~` change
pub fn diff_marker(diff: &ResourceDiff) -> char {
    if diff.is_addition() {
        '+'
    } else if diff.is_removal() {
        '-'
    } else {
        '~'
    }
}

/// Display label for a resource type
pub fn type_label(resource_type: &str) -> &str {
    match resource_type {
        "option_def" => "Option definitions",
        "subnet" => "Subnets",
        "reservation" => "Reservations",
        other => other,
    }
}

/// Line diff between two rendered states
pub fn text_diff(from: &str, to: &str) -> Vec<(char, String)> {
    similar::TextDiff::from_lines(from, to)
        .iter_all_changes()
        .filter_map(|change| {
            let marker = match change.tag() {
                similar::ChangeTag::Delete => '-',
                similar::ChangeTag::Insert => '+',
                similar::ChangeTag::Equal => return None,
            };
            Some((marker, change.value().trim_end().to_string()))
        })
        .collect()
}

/// Print one resource diff with its attribute changes
pub fn print_diff(diff: &ResourceDiff) {
    let marker = diff_marker(diff);
    let colored_marker = match marker {
        '+' => "+".green(),
        '-' => "-".red(),
        _ => "~".yellow(),
    };
    println!("  {} {}", colored_marker, diff.resource_id.bold());

    match (&diff.current, &diff.desired) {
        (ResourceState::Absent, ResourceState::Present { details }) => {
            for line in details.as_deref().unwrap_or_default().lines() {
                println!("      {}", format!("+ {line}").green());
            }
        }
        (ResourceState::Present { details: from }, ResourceState::Present { details: to }) => {
            let from = from.as_deref().unwrap_or_default();
            let to = to.as_deref().unwrap_or_default();
            for (marker, line) in text_diff(from, to) {
                let text = format!("{marker} {line}");
                if marker == '+' {
                    println!("      {}", text.green());
                } else {
                    println!("      {}", text.red());
                }
            }
        }
        (ResourceState::Present { .. }, ResourceState::Absent) => {
            println!("      {}", "(will remove)".dimmed());
        }
        _ => {}
    }
}
