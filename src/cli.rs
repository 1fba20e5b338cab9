//! Terminal front-end: drives the wizard from stdin, one prompt per field.
//!
//! Typing `back` at any prompt returns to the previous step and `quit`
//! leaves without finishing.

use tokio::io::{AsyncBufRead, AsyncBufReadExt, Lines};

use crate::error::Result;
use crate::onboarding::{
    Address, BusinessAim, Industry, NavTarget, Navigator, Notifier, OnboardingWizard, PosUsage,
    StepData, SubmitOutcome, ToastKind, WizardPosition, WizardStep,
};

/// Prints toasts to stderr.
#[derive(Debug, Default)]
pub struct TerminalNotifier;

impl Notifier for TerminalNotifier {
    fn show_toast(&self, kind: ToastKind, message: &str) {
        match kind {
            ToastKind::Success => eprintln!("✅ {message}"),
            ToastKind::Error => eprintln!("❌ {message}"),
            ToastKind::Info => eprintln!("ℹ️  {message}"),
        }
    }
}

/// Logs route changes; the prompt loop follows the wizard position itself.
#[derive(Debug, Default)]
pub struct TerminalNavigator;

impl Navigator for TerminalNavigator {
    fn navigate(&self, target: NavTarget) {
        match &target {
            NavTarget::Route(path) => tracing::debug!(route = %path, "Route change"),
            NavTarget::External(url) => eprintln!("→ Opening {url}"),
        }
    }
}

enum Answer {
    Value(String),
    Back,
    Quit,
}

enum Collected {
    Data(StepData),
    Back,
    Quit,
}

/// Reads one answer per prompt from a line source.
struct Prompter<R> {
    lines: Lines<R>,
}

impl<R: AsyncBufRead + Unpin> Prompter<R> {
    async fn ask(&mut self, label: &str) -> std::io::Result<Answer> {
        eprint!("{label}: ");
        let Some(line) = self.lines.next_line().await? else {
            return Ok(Answer::Quit); // EOF
        };
        let line = line.trim();
        Ok(match line.to_ascii_lowercase().as_str() {
            "back" => Answer::Back,
            "quit" | "exit" => Answer::Quit,
            _ => Answer::Value(line.to_string()),
        })
    }
}

/// Pick from a numbered list by 1-based index or by slug.
fn pick<T: Copy>(options: &[T], input: &str, slug: impl Fn(&T) -> &str) -> Option<T> {
    if let Ok(n) = input.parse::<usize>() {
        return n.checked_sub(1).and_then(|i| options.get(i)).copied();
    }
    options
        .iter()
        .find(|o| slug(o).eq_ignore_ascii_case(input))
        .copied()
}

fn optional(value: String) -> Option<String> {
    if value.is_empty() { None } else { Some(value) }
}

/// Early-return `Back`/`Quit` from a collector.
macro_rules! answer {
    ($prompter:expr, $label:expr) => {
        match $prompter.ask($label).await? {
            Answer::Value(v) => v,
            Answer::Back => return Ok(Collected::Back),
            Answer::Quit => return Ok(Collected::Quit),
        }
    };
}

async fn collect<R: AsyncBufRead + Unpin>(
    prompter: &mut Prompter<R>,
    step: WizardStep,
) -> std::io::Result<Collected> {
    let data = match step {
        WizardStep::CompanyInfo => StepData::CompanyInfo {
            company_name: answer!(prompter, "Company name"),
        },
        WizardStep::Industry => {
            for (i, industry) in Industry::ALL.iter().enumerate() {
                eprintln!("  {}. {}", i + 1, industry.label());
            }
            let industry = pick(&Industry::ALL, &answer!(prompter, "Industry"), |i| i.as_str());
            let sub_industry = match industry {
                Some(industry) if industry.has_sub_industries() => {
                    let subs = industry.sub_industries();
                    for (i, sub) in subs.iter().enumerate() {
                        eprintln!("  {}. {sub}", i + 1);
                    }
                    let raw = answer!(prompter, "Sub-industry");
                    pick(subs, &raw, |s| *s)
                        .map(String::from)
                        .or_else(|| optional(raw))
                }
                _ => None,
            };
            StepData::Industry {
                industry,
                sub_industry,
                branch_location: answer!(prompter, "Branch location"),
            }
        }
        WizardStep::Address => StepData::Address(Address {
            street: answer!(prompter, "Street address"),
            city: answer!(prompter, "City"),
            state: answer!(prompter, "State"),
            country: answer!(prompter, "Country code (e.g. IN)"),
            postal_code: answer!(prompter, "Postal code"),
        }),
        WizardStep::PosUsage => {
            for (i, usage) in PosUsage::ALL.iter().enumerate() {
                eprintln!("  {}. {}", i + 1, usage.label());
            }
            let pos_usage = pick(&PosUsage::ALL, &answer!(prompter, "POS usage"), |u| {
                u.as_str()
            });
            let (current_software, specific_needs) = match pos_usage {
                Some(PosUsage::AlreadyUsing) => {
                    (optional(answer!(prompter, "Current software")), None)
                }
                Some(PosUsage::WantBiz365) => (
                    None,
                    optional(answer!(prompter, "Anything specific you need (optional)")),
                ),
                _ => (None, None),
            };
            StepData::PosUsage {
                pos_usage,
                current_software,
                specific_needs,
            }
        }
        WizardStep::BusinessAims => {
            for (i, aim) in BusinessAim::ALL.iter().enumerate() {
                eprintln!("  {}. {}", i + 1, aim.label());
            }
            let raw = answer!(prompter, "Aims (comma separated)");
            let business_aims: std::collections::BTreeSet<BusinessAim> = raw
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .filter_map(|s| pick(&BusinessAim::ALL, s, |a| a.as_str()))
                .collect();
            let other_aim = if business_aims.contains(&BusinessAim::Other) {
                optional(answer!(prompter, "Describe your other aim"))
            } else {
                None
            };
            StepData::BusinessAims {
                business_aims,
                other_aim,
            }
        }
    };
    Ok(Collected::Data(data))
}

/// Run the wizard against a line source until it completes or the user quits.
///
/// Returns the hand-off URL when onboarding completed.
pub async fn run<R: AsyncBufRead + Unpin>(
    wizard: &OnboardingWizard,
    input: R,
) -> Result<Option<String>> {
    let mut prompter = Prompter {
        lines: input.lines(),
    };

    loop {
        let step = match wizard.position().await {
            WizardPosition::Step(step) => step,
            WizardPosition::Completed => return Ok(None),
        };
        eprintln!(
            "\nStep {} of {}: {}",
            step.number(),
            WizardStep::ALL.len(),
            step.title()
        );

        match collect(&mut prompter, step).await? {
            Collected::Quit => return Ok(None),
            Collected::Back => {
                if let Err(e) = wizard.retreat().await {
                    eprintln!("{e}");
                }
            }
            Collected::Data(data) => match wizard.submit(data).await? {
                SubmitOutcome::Invalid(errors) => {
                    for (field, message) in errors.iter() {
                        eprintln!("  {field}: {message}");
                    }
                }
                SubmitOutcome::Completed { redirect } => return Ok(Some(redirect)),
                // Failures were already toasted; the step stays active for a retry.
                SubmitOutcome::Advanced(_)
                | SubmitOutcome::SaveFailed { .. }
                | SubmitOutcome::FinalizeFailed { .. }
                | SubmitOutcome::InFlight
                | SubmitOutcome::Stale => {}
            },
        }
    }
}
