//! Typed parameters for slash commands

use serenity::builder::CreateApplicationCommandOption;
use serenity::model::application::command::CommandOptionType;

/// Value of a predefined choice
///
/// Should match the option's kind; the platform rejects mismatches at
/// registration time, nothing is checked locally.
#[derive(Debug, Clone, PartialEq)]
pub enum ChoiceValue {
    String(String),
    Integer(i32),
    Number(f64),
}

impl From<&str> for ChoiceValue {
    fn from(value: &str) -> Self {
        ChoiceValue::String(value.to_string())
    }
}

impl From<String> for ChoiceValue {
    fn from(value: String) -> Self {
        ChoiceValue::String(value)
    }
}

impl From<i32> for ChoiceValue {
    fn from(value: i32) -> Self {
        ChoiceValue::Integer(value)
    }
}

impl From<f64> for ChoiceValue {
    fn from(value: f64) -> Self {
        ChoiceValue::Number(value)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Choice {
    pub name: String,
    pub value: ChoiceValue,
}

/// A named, typed parameter of a slash command
#[derive(Debug, Clone)]
pub struct CommandOption {
    name: String,
    kind: CommandOptionType,
    description: String,
    required: bool,
    choices: Vec<Choice>,
}

impl CommandOption {
    /// Panics on an empty name
    pub fn new(name: impl Into<String>, kind: CommandOptionType) -> Self {
        let name = name.into();
        if name.is_empty() {
            panic!("empty option name");
        }

        Self {
            name,
            kind,
            description: String::new(),
            required: false,
            choices: Vec::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    /// Append a choice; order is kept
    pub fn add_choice(mut self, name: impl Into<String>, value: impl Into<ChoiceValue>) -> Self {
        self.choices.push(Choice {
            name: name.into(),
            value: value.into(),
        });
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> CommandOptionType {
        self.kind
    }

    pub fn required(&self) -> bool {
        self.required
    }

    pub fn choices(&self) -> &[Choice] {
        &self.choices
    }

    pub(crate) fn create_payload(&self) -> CreateApplicationCommandOption {
        let mut option = CreateApplicationCommandOption::default();
        option
            .name(&self.name)
            .description(&self.description)
            .kind(self.kind)
            .required(self.required);

        for choice in &self.choices {
            match &choice.value {
                ChoiceValue::String(value) => option.add_string_choice(&choice.name, value),
                ChoiceValue::Integer(value) => option.add_int_choice(&choice.name, *value),
                ChoiceValue::Number(value) => option.add_number_choice(&choice.name, *value),
            };
        }

        option
    }
}
