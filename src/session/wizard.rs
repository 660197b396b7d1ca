use crate::models::{Counter, Goals};
use crate::utils::input::{is_default_keyword, parse_amount, InputError, DEFAULT_KEYWORD};

/// Linear goal-setup flow: one step per counter in `Counter::ALL` order,
/// then complete. Invalid input leaves the step unchanged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GoalSetup {
    step: usize,
    defaults: Goals,
    collected: Goals,
}

/// A value accepted by the wizard, ready to persist.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SetupAnswer {
    pub counter: Counter,
    pub value: u32,
    pub finished: bool,
}

impl GoalSetup {
    pub fn new(defaults: Goals) -> Self {
        Self {
            step: 0,
            defaults,
            collected: defaults,
        }
    }

    pub fn current(&self) -> Option<Counter> {
        Counter::ALL.get(self.step).copied()
    }

    pub fn step_number(&self) -> usize {
        self.step
    }

    pub const TOTAL_STEPS: usize = Counter::ALL.len();

    pub fn is_complete(&self) -> bool {
        self.current().is_none()
    }

    pub fn default_for(&self, counter: Counter) -> u32 {
        self.defaults.get(counter)
    }

    /// Goals as answered so far, defaults for the rest.
    pub fn collected(&self) -> Goals {
        self.collected
    }

    pub fn prompt(&self) -> Option<String> {
        let counter = self.current()?;
        Some(format!(
            "{} {}\nType a number, or '{}' (= {}).",
            counter.icon(),
            counter.setup_question(),
            DEFAULT_KEYWORD,
            self.default_for(counter)
        ))
    }

    /// Accepts a number or the default keyword for the current step.
    /// Returns `Ok(None)` once setup is already complete.
    pub fn submit(&mut self, text: &str) -> Result<Option<SetupAnswer>, InputError> {
        let Some(counter) = self.current() else {
            return Ok(None);
        };
        let value = if is_default_keyword(text) {
            self.default_for(counter)
        } else {
            parse_amount(text)?
        };
        self.collected.set(counter, value);
        self.step += 1;
        Ok(Some(SetupAnswer {
            counter,
            value,
            finished: self.is_complete(),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn walks_every_counter_in_order() {
        let mut setup = GoalSetup::new(Goals::default());
        let inputs = ["10", "default", "33", "50,4", "DEFAULT"];
        let mut answers = Vec::new();
        for input in inputs {
            answers.push(setup.submit(input).unwrap().unwrap());
        }
        let counters: Vec<Counter> = answers.iter().map(|a| a.counter).collect();
        assert_eq!(counters, Counter::ALL.to_vec());
        assert!(answers[4].finished);
        assert!(answers[..4].iter().all(|a| !a.finished));
        assert!(setup.is_complete());

        let goals = setup.collected();
        assert_eq!(goals.quran_pages, 10);
        assert_eq!(goals.istighfar, 500);
        assert_eq!(goals.dhikr, 33);
        assert_eq!(goals.charity, 50);
        assert_eq!(goals.dua, 3);
    }

    #[test]
    fn invalid_input_does_not_advance() {
        let mut setup = GoalSetup::new(Goals::default());
        assert_eq!(setup.submit("-3"), Err(InputError::Negative));
        assert!(matches!(setup.submit("lots"), Err(InputError::NotANumber(_))));
        assert_eq!(setup.current(), Some(Counter::QuranPages));
        assert_eq!(setup.step_number(), 0);
        setup.submit("0").unwrap();
        assert_eq!(setup.current(), Some(Counter::Istighfar));
    }

    #[test]
    fn submitting_after_completion_is_a_no_op() {
        let mut setup = GoalSetup::new(Goals::default());
        for _ in 0..GoalSetup::TOTAL_STEPS {
            setup.submit("default").unwrap();
        }
        assert_eq!(setup.submit("5"), Ok(None));
        assert!(setup.prompt().is_none());
    }

    #[test]
    fn prompt_mentions_the_default() {
        let setup = GoalSetup::new(Goals::default());
        let prompt = setup.prompt().unwrap();
        assert!(prompt.contains("Quran"));
        assert!(prompt.contains("= 20"));
    }
}
