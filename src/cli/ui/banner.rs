use crate::cli::ui::formatting::Formatter;
use crate::core::steps::{Step, TOTAL_STEPS};
use crate::utils::build_info;

pub struct Banner;

impl Banner {
    pub fn render(business_name: &str) {
        let formatter = Formatter::new();
        println!("{}", formatter.header_text(format!("{business_name} | Instant Quote")));
        println!("{}", formatter.detail_text(Self::text()));
    }

    pub fn text() -> String {
        format!(
            "Get a personalized quote on WhatsApp in {TOTAL_STEPS} quick steps. funnel_core {}",
            build_info::current().short()
        )
    }

    /// `[■■■□□] Step 3 of 5: Pick a package`
    pub fn progress(step: Step) -> String {
        let done = usize::from(step.index());
        let total = usize::from(TOTAL_STEPS);
        let plain = crate::cli::output::current_preferences().plain_mode;
        let (filled, empty) = if plain { ("#", "-") } else { ("■", "□") };
        format!("[{}{}] {}", filled.repeat(done), empty.repeat(total - done), step)
    }
}
