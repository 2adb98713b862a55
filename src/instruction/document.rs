use serde::{Serialize, Deserialize};

/// A single step of a quest
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Step {
    pub text: String,
    /// Rough estimate, in minutes
    #[serde(default)]
    pub estimate_mins: Option<u32>
}

impl Step {
    pub fn new<A: Into<String>>(text: A) -> Step {
        Step {
            text: text.into(),
            estimate_mins: None
        }
    }

    pub fn with_estimate(mut self, minutes: u32) -> Step {
        self.estimate_mins = Some(minutes);
        self
    }
}

/// A task broken down into tiny steps, the main thing this crate prints
///
/// ```rust
/// use quest_printer::{Quest, Step};
///
/// let quest = Quest::new("Clean the kitchen")
///     .with_description("Just the counter for now.")
///     .with_steps(Quest::steps_from_csv("Clear the counter, Wipe it down"))
///     .with_next_action("Pick up the first cup");
/// assert_eq!(2, quest.steps.len());
/// assert_eq!(Step::new("Wipe it down"), quest.steps[1]);
/// ```
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Quest {
    pub title: String,
    /// Free text, paragraphs separated by newlines
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub steps: Vec<Step>,
    /// The very next physical action, printed in the activation block
    #[serde(default)]
    pub next_action: Option<String>,
    #[serde(default)]
    pub total_estimate_mins: Option<u32>
}

impl Quest {
    pub fn new<A: Into<String>>(title: A) -> Quest {
        Quest {
            title: title.into(),
            description: String::new(),
            steps: Vec::new(),
            next_action: None,
            total_estimate_mins: None
        }
    }

    pub fn with_description<A: Into<String>>(mut self, description: A) -> Quest {
        self.description = description.into();
        self
    }

    pub fn with_steps<I: IntoIterator<Item = Step>>(mut self, steps: I) -> Quest {
        self.steps = steps.into_iter().collect();
        self
    }

    pub fn with_next_action<A: Into<String>>(mut self, next_action: A) -> Quest {
        self.next_action = Some(next_action.into());
        self
    }

    pub fn with_total_estimate(mut self, minutes: u32) -> Quest {
        self.total_estimate_mins = Some(minutes);
        self
    }

    /// Splits a comma separated list into steps, dropping the empty ones
    pub fn steps_from_csv<A: AsRef<str>>(raw: A) -> Vec<Step> {
        raw.as_ref()
            .split(',')
            .map(str::trim)
            .filter(|item| !item.is_empty())
            .map(Step::new)
            .collect()
    }
}

/// Anything that can be rendered into a receipt
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(tag = "kind")]
pub enum Document {
    /// A structured quest, laid out with the quest template
    Quest {
        quest: Quest
    },
    /// Markdown-like text, laid out block by block
    Markup {
        text: String
    }
}

impl Document {
    pub fn quest(quest: Quest) -> Document {
        Document::Quest{quest}
    }

    pub fn markup<A: Into<String>>(text: A) -> Document {
        Document::Markup{text: text.into()}
    }

    /// Markup document with a level one heading on top, skipped if the title is blank
    ///
    /// ```rust
    /// use quest_printer::Document;
    ///
    /// assert_eq!(Document::markup("# Groceries\n\n- milk"), Document::titled_markup(" Groceries ", "- milk"));
    /// assert_eq!(Document::markup("- milk"), Document::titled_markup("", "- milk"));
    /// ```
    pub fn titled_markup<A: AsRef<str>, B: AsRef<str>>(title: A, body: B) -> Document {
        let title = title.as_ref().trim();
        let text = if title.is_empty() {
            body.as_ref().to_string()
        } else {
            format!("# {}\n\n{}", title, body.as_ref())
        };
        Document::Markup{text}
    }
}

impl From<Quest> for Document {
    fn from(quest: Quest) -> Document {
        Document::Quest{quest}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn csv_steps_skip_blanks() {
        let steps = Quest::steps_from_csv(" a, ,b ,,c");
        let texts: Vec<&str> = steps.iter().map(|s| s.text.as_str()).collect();
        assert_eq!(vec!["a", "b", "c"], texts);
        assert!(Quest::steps_from_csv("").is_empty());
    }

    #[test]
    fn quest_deserializes_with_defaults() {
        let document: Document = serde_json::from_str(
            r#"{"kind":"Quest","quest":{"title":"Laundry","steps":[{"text":"Sort"}]}}"#
        ).unwrap();
        let expected = Quest::new("Laundry").with_steps(vec![Step::new("Sort")]);
        assert_eq!(Document::Quest{quest: expected}, document);
    }
}
