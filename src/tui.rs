//! Macros for operator-facing terminal output.
//!
//! Every stage talks to the operator through these three macros rather than
//! bare `println!`, so quiet mode and accessible mode are honored
//! everywhere. Accessible mode drops the colored sigils that screen readers
//! stumble over.

/// Prints a stage-progress line, prefixed with a blue `[~]` sigil unless
/// accessible mode is on. Suppressed entirely in quiet mode.
#[macro_export]
macro_rules! output {
    ($name:expr, $quiet:expr, $accessible:expr) => {
        if !$quiet {
            if $accessible {
                println!("{}", $name);
            } else {
                println!(
                    "{} {}",
                    colored::Colorize::bold(colored::Colorize::blue("[~]")),
                    $name
                );
            }
        }
    };
}

/// Prints a warning line with a red `[!]` sigil. Warnings survive quiet
/// mode; they are the non-fatal half of the error policy.
#[macro_export]
macro_rules! warning {
    ($name:expr) => {
        eprintln!(
            "{} {}",
            colored::Colorize::bold(colored::Colorize::red("[!]")),
            $name
        );
    };
    ($name:expr, $accessible:expr) => {
        if $accessible {
            eprintln!("{}", $name);
        } else {
            eprintln!(
                "{} {}",
                colored::Colorize::bold(colored::Colorize::red("[!]")),
                $name
            );
        }
    };
}

/// Prints a secondary detail line, dimmed unless accessible mode is on.
/// Suppressed in quiet mode.
#[macro_export]
macro_rules! detail {
    ($name:expr, $quiet:expr, $accessible:expr) => {
        if !$quiet {
            if $accessible {
                println!("{}", $name);
            } else {
                let line: &str = &$name;
                println!("    {}", colored::Colorize::dimmed(line));
            }
        }
    };
}

#[cfg(test)]
mod tests {
    #[test]
    fn macros_expand() {
        output!("building list", false, false);
        output!("building list", false, true);
        detail!(String::from("wrote 3 ranges"), false, false);
        warning!("zgrab2 failed for port 80");
        warning!("zgrab2 failed for port 80", true);
    }
}
