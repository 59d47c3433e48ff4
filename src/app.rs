//! Terminal front end: runs a [`FormRenderer`] in a crossterm session.

use std::io::{self, Write};

use thiserror::Error;

use crate::error::SubmitError;
use crate::event::InputEvent;
use crate::form::value::FormValues;
use crate::geometry::Region;
use crate::render::driver::Driver;
use crate::renderer::{FormRenderer, SubmitOutcome};

/// Why a terminal session stopped with an error.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("terminal I/O failed: {0}")]
    Io(#[from] io::Error),

    /// Submission failed; the form is still intact and can be run again.
    #[error(transparent)]
    Submit(#[from] SubmitError),
}

/// How a session ended.
#[derive(Debug, Clone, PartialEq)]
pub enum FormExit {
    /// The form was submitted; these are the values the callback received.
    Submitted(FormValues),
    /// The user quit, or input ran out, without submitting.
    Quit,
}

/// A form bound to the terminal.
///
/// # Examples
///
/// ```ignore
/// let form = FormRenderer::new(fields, schema, |values| Ok(()))?;
/// match FormApp::new(form).run()? {
///     FormExit::Submitted(values) => println!("{}", values.to_json()?),
///     FormExit::Quit => {}
/// }
/// ```
#[derive(Debug)]
pub struct FormApp {
    form: FormRenderer,
    width: u16,
    height: u16,
}

impl FormApp {
    pub fn new(form: FormRenderer) -> Self {
        Self {
            form,
            width: 80,
            height: 24,
        }
    }

    pub fn form(&self) -> &FormRenderer {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut FormRenderer {
        &mut self.form
    }

    pub fn into_form(self) -> FormRenderer {
        self.form
    }

    /// Run on the real terminal: raw mode plus alternate screen, restored on
    /// every exit path.
    pub fn run(&mut self) -> Result<FormExit, AppError> {
        let (width, height) = Driver::terminal_size()?;
        self.width = width;
        self.height = height;

        let mut driver = Driver::new();
        driver.enter_alt_screen()?;
        let events = std::iter::from_fn(|| Some(crossterm::event::read().map(InputEvent::from)));
        let result = self.run_with(&mut driver, events);
        let restored = driver.leave_alt_screen();
        let exit = result?;
        restored?;
        Ok(exit)
    }

    /// Draw, then feed `events` one at a time until the form quits or submits.
    ///
    /// Running out of events counts as quitting.
    pub fn run_with<W: Write>(
        &mut self,
        driver: &mut Driver<W>,
        events: impl IntoIterator<Item = io::Result<InputEvent>>,
    ) -> Result<FormExit, AppError> {
        self.draw(driver)?;
        for event in events {
            let event = event?;
            if let InputEvent::Resize { width, height } = event {
                self.width = width;
                self.height = height;
            }
            let outcome = self.form.handle_input(event)?;
            if outcome == Some(SubmitOutcome::Submitted) {
                tracing::info!("form session finished");
                return Ok(FormExit::Submitted(self.form.values()));
            }
            if self.form.should_quit() {
                return Ok(FormExit::Quit);
            }
            self.draw(driver)?;
        }
        Ok(FormExit::Quit)
    }

    fn draw<W: Write>(&self, driver: &mut Driver<W>) -> io::Result<()> {
        let region = Region::new(1, 1, i32::from(self.width) - 2, i32::from(self.height) - 1);
        driver.draw(&self.form.render(region))
    }
}
