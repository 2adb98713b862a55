use quest_printer::{Document, Quest, RenderOptions, Renderer, Step, StepStyle, preview};

const NOTES: &str = "# Weekend plan
Nothing fancy, just **three** things and a *walk*.

## Errands
- Return the [library book](https://library.example.com/loans)
- Buy bread at the bakery near the station
1. Call grandma
2. Water the plants

> Done is better than perfect
---
| Item | Qty |
";

fn main() {
    tracing_subscriber::fmt::init();

    let quest = Quest::new("Clean the desk")
        .with_description("The desk is a mess.\nFive minutes is enough to make it usable again.")
        .with_steps(vec![
            Step::new("Throw away the empty cups").with_estimate(1),
            Step::new("Stack the papers in a single pile").with_estimate(2),
            Step::new("Wipe the surface")
        ])
        .with_next_action("Pick up the closest cup")
        .with_total_estimate(5);
    // Same layout as 58mm paper, with the activation block filled in
    let renderer = Renderer::new(32).with_options(RenderOptions {
        step_style: StepStyle::Checkbox,
        cue_text: Some("Right after this coffee".to_string()),
        timer_minutes: Some(5),
        show_time_estimates: true,
        ..RenderOptions::default()
    });
    print!("{}", preview::plain_text(&renderer.render(&Document::quest(quest))));
    println!("================================");
    print!("{}", preview::plain_text(&Renderer::new(32).render(&Document::markup(NOTES))));
}
