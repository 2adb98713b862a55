use crate::{Formatter, Instruction, Justification, Quest, Style};
use super::{Receipt, RenderOptions, StepStyle};

const SUBTITLE: &str = "- Focus on the first tiny step -";

pub(super) fn render_quest(receipt: &mut Receipt, formatter: &Formatter, options: &RenderOptions, quest: &Quest, closing: &str) {
    // Attention beep, best effort like the one in the footer
    receipt.push(Instruction::Beep{times: 2, duration: 3});
    receipt.plain(formatter.rule());
    receipt.styled(Style::double(Justification::Center), formatter.truncate(quest.title.trim()));
    receipt.styled(Style::default().with_justification(Justification::Center), formatter.truncate(SUBTITLE));
    receipt.blank();

    if !quest.description.trim().is_empty() {
        for paragraph in quest.description.lines() {
            if paragraph.trim().is_empty() {
                receipt.blank();
                continue;
            }
            for line in formatter.wrap(paragraph) {
                receipt.plain(line);
            }
        }
        receipt.blank();
    }

    let timer = options.timer_minutes.filter(|minutes| *minutes > 0);
    let cue = options.cue_text.as_deref().filter(|cue| !cue.trim().is_empty());
    let next_action = quest.next_action.as_deref().filter(|action| !action.trim().is_empty());
    if options.include_activation && (cue.is_some() || next_action.is_some() || timer.is_some()) {
        receipt.plain(formatter.rule());
        receipt.styled(Style::text(true, false), "Start now:");
        if let Some(cue) = cue {
            for line in formatter.hanging("• ", cue) {
                receipt.plain(line);
            }
        }
        if let Some(next_action) = next_action {
            for line in formatter.hanging("→ ", next_action) {
                receipt.plain(line);
            }
        }
        if let Some(minutes) = timer {
            for line in formatter.wrap(format!("[ Set a {}-minute timer and just start. ]", minutes)) {
                receipt.plain(line);
            }
        }
        receipt.blank();
    }

    if !quest.steps.is_empty() {
        receipt.plain(formatter.rule());
        receipt.styled(Style::text(true, false), "Steps:");
        for (index, step) in quest.steps.iter().enumerate() {
            let prefix = match options.step_style {
                StepStyle::Checkbox => "[ ] ".to_string(),
                StepStyle::Numbered => format!("{}. ", index + 1)
            };
            for line in formatter.hanging(&prefix, step.text.trim()) {
                receipt.plain(line);
            }
            match step.estimate_mins {
                Some(minutes) if options.show_time_estimates && minutes > 0 => {
                    receipt.plain(format!("   (~{} min)", minutes));
                },
                _ => ()
            }
        }
        receipt.blank();
    }

    match quest.total_estimate_mins {
        Some(minutes) if options.show_time_estimates && minutes > 0 => {
            receipt.plain(formatter.rule());
            for line in formatter.wrap(format!("Estimated total: ~{} min", minutes)) {
                receipt.styled(Style::text(true, false), line);
            }
            receipt.blank();
        },
        _ => ()
    }

    receipt.plain(formatter.rule());
    for line in formatter.wrap(closing) {
        receipt.styled(Style::text(true, false).with_justification(Justification::Center), line);
    }
    if let Some(link) = options.qr_link.as_deref().filter(|link| !link.trim().is_empty()) {
        receipt.push(Instruction::QrCode{content: link.to_string()});
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Step;
    use crate::preview::plain_text;
    use pretty_assertions::assert_eq;

    fn lines(quest: &Quest, options: &RenderOptions, columns: usize) -> Vec<String> {
        let mut receipt = Receipt::default();
        render_quest(&mut receipt, &Formatter::new(columns), options, quest, "Tiny actions. Big wins.");
        plain_text(&receipt.instructions).lines().map(String::from).collect()
    }

    #[test]
    fn full_layout() {
        let quest = Quest::new("  Laundry day  ")
            .with_description("Only the dark clothes.\n\nThe rest can wait.")
            .with_steps(vec![
                Step::new("Grab the basket").with_estimate(1),
                Step::new("Sort the darks into the machine")
            ])
            .with_next_action("Stand up")
            .with_total_estimate(10);
        let options = RenderOptions {
            cue_text: Some("After this coffee".to_string()),
            timer_minutes: Some(5),
            show_time_estimates: true,
            ..RenderOptions::default()
        };
        assert_eq!(
            vec![
                "--------------------------------",
                "Laundry day",
                "- Focus on the first tiny step -",
                "",
                "Only the dark clothes.",
                "",
                "The rest can wait.",
                "",
                "--------------------------------",
                "Start now:",
                "• After this coffee",
                "→ Stand up",
                "[ Set a 5-minute timer and just",
                "start. ]",
                "",
                "--------------------------------",
                "Steps:",
                "1. Grab the basket",
                "   (~1 min)",
                "2. Sort the darks into the",
                "   machine",
                "",
                "--------------------------------",
                "Estimated total: ~10 min",
                "",
                "--------------------------------",
                "Tiny actions. Big wins."
            ],
            lines(&quest, &options, 32)
        );
    }

    #[test]
    fn minimal_quest_skips_optional_blocks() {
        let quest = Quest::new("Tea");
        assert_eq!(
            vec!["----------", "Tea", "- Focus on", "", "----------", "Tiny", "actions.", "Big wins."],
            lines(&quest, &RenderOptions::default(), 10)
        );
    }

    #[test]
    fn activation_block_can_be_disabled() {
        let quest = Quest::new("Tea").with_next_action("Boil water");
        let options = RenderOptions {
            include_activation: false,
            ..RenderOptions::default()
        };
        assert!(!lines(&quest, &options, 20).iter().any(|line| line == "Start now:"));
        assert!(lines(&quest, &RenderOptions::default(), 20).iter().any(|line| line == "→ Boil water"));
    }

    #[test]
    fn checkbox_steps() {
        let quest = Quest::new("Tea").with_steps(Quest::steps_from_csv("Boil water, Pour"));
        let options = RenderOptions {
            step_style: StepStyle::Checkbox,
            ..RenderOptions::default()
        };
        let lines = lines(&quest, &options, 20);
        assert!(lines.contains(&"[ ] Boil water".to_string()));
        assert!(lines.contains(&"[ ] Pour".to_string()));
    }

    #[test]
    fn estimates_are_hidden_by_default() {
        let quest = Quest::new("Tea")
            .with_steps(vec![Step::new("Boil water").with_estimate(3)])
            .with_total_estimate(3);
        let lines = lines(&quest, &RenderOptions::default(), 20);
        assert!(!lines.iter().any(|line| line.contains("min")));
    }

    #[test]
    fn title_is_double_size_and_truncated() {
        let mut receipt = Receipt::default();
        render_quest(&mut receipt, &Formatter::new(5), &RenderOptions::default(), &Quest::new("Groceries"), "x");
        assert_eq!(Instruction::style(Style::double(Justification::Center)), receipt.instructions[5]);
        assert_eq!(Instruction::text("Groce\n"), receipt.instructions[6]);
    }

    #[test]
    fn quests_start_with_an_attention_beep() {
        let mut receipt = Receipt::default();
        render_quest(&mut receipt, &Formatter::new(20), &RenderOptions::default(), &Quest::new("Tea"), "x");
        assert_eq!(Instruction::Beep{times: 2, duration: 3}, receipt.instructions[0]);
        assert!(receipt.instructions[0].is_best_effort());
    }

    #[test]
    fn qr_link_follows_the_closing_line() {
        let options = RenderOptions {
            qr_link: Some("https://example.com".to_string()),
            ..RenderOptions::default()
        };
        let mut receipt = Receipt::default();
        render_quest(&mut receipt, &Formatter::new(20), &options, &Quest::new("Tea"), "x");
        assert_eq!(
            Some(&Instruction::QrCode{content: "https://example.com".to_string()}),
            receipt.instructions.last()
        );
    }
}
