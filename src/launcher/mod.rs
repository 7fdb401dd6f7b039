//! Remote script launcher: list `.sh` files in a GitHub repository, pick one, run it.
//!
//! States move strictly forward: `Listing` → `Selecting` → `Confirming` → `Executing` →
//! `Done`, with `Failed` reachable from any of them.
mod executor;
mod source;

pub use executor::{ScriptExecutor, ShellExecutor};
pub use source::{filter_scripts, parse_listing, ContentEntry, GithubSource, RemoteScript, ScriptSource};

use crate::errors::DockhandError;
use crate::ui::{choose_index, confirm, Prompter};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LauncherState {
    Listing,
    Selecting,
    Confirming,
    Executing,
    Done,
    Failed,
}

#[derive(Debug, Clone, Default)]
pub struct LaunchOptions {
    /// Hidden from the menu (the launcher's own script).
    pub self_name: String,
    /// Print the scripts and stop.
    pub list_only: bool,
    /// Skip the menu and use this script.
    pub script: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LaunchOutcome {
    Listed(Vec<String>),
    /// The user quit the menu or answered no.
    Declined,
    Ran { script: String },
}

pub struct Launcher<'a> {
    source: &'a dyn ScriptSource,
    executor: &'a dyn ScriptExecutor,
    opts: LaunchOptions,
    state: LauncherState,
    history: Vec<LauncherState>,
}

impl<'a> Launcher<'a> {
    pub fn new(
        source: &'a dyn ScriptSource,
        executor: &'a dyn ScriptExecutor,
        opts: LaunchOptions,
    ) -> Self {
        Self {
            source,
            executor,
            opts,
            state: LauncherState::Listing,
            history: vec![LauncherState::Listing],
        }
    }

    pub fn state(&self) -> LauncherState {
        self.state
    }

    /// Every state entered so far, in order.
    pub fn history(&self) -> &[LauncherState] {
        &self.history
    }

    fn enter(&mut self, next: LauncherState) {
        tracing::debug!(from = ?self.state, to = ?next, "launcher state");
        self.state = next;
        self.history.push(next);
    }

    pub fn run(&mut self, p: &mut dyn Prompter) -> Result<LaunchOutcome, DockhandError> {
        let result = self.drive(p);
        if result.is_err() {
            self.enter(LauncherState::Failed);
        }
        result
    }

    fn drive(&mut self, p: &mut dyn Prompter) -> Result<LaunchOutcome, DockhandError> {
        let origin = self.source.describe();
        let scripts = filter_scripts(self.source.list()?, &self.opts.self_name);
        if scripts.is_empty() {
            return Err(DockhandError::Message(format!(
                "no .sh scripts found in {origin}"
            )));
        }

        if self.opts.list_only {
            self.enter(LauncherState::Done);
            return Ok(LaunchOutcome::Listed(
                scripts.into_iter().map(|s| s.name).collect(),
            ));
        }

        let chosen = match self.opts.script.clone() {
            Some(name) => scripts
                .iter()
                .find(|s| s.name == name)
                .cloned()
                .ok_or_else(|| {
                    DockhandError::InvalidInput(format!("script '{name}' not found in {origin}"))
                })?,
            None => {
                self.enter(LauncherState::Selecting);
                p.show(&format!("Scripts available in {origin}:"));
                for (i, s) in scripts.iter().enumerate() {
                    p.show(&format!("  {:>2}) {}", i + 1, s.name));
                }
                let question = format!("Select a script [1-{}] or 'q' to quit", scripts.len());
                match choose_index(p, &question, scripts.len())? {
                    Some(i) => scripts[i].clone(),
                    None => {
                        self.enter(LauncherState::Done);
                        return Ok(LaunchOutcome::Declined);
                    }
                }
            }
        };

        self.enter(LauncherState::Confirming);
        if !confirm(p, &format!("Run '{}' with elevated privileges?", chosen.name), false)? {
            self.enter(LauncherState::Done);
            return Ok(LaunchOutcome::Declined);
        }

        self.enter(LauncherState::Executing);
        let body = self.source.download(&chosen)?;
        tracing::info!(script = %chosen.name, bytes = body.len(), "downloaded");
        let code = self.executor.execute(&chosen, &body)?;
        if code != 0 {
            return Err(DockhandError::CommandFailed {
                command: chosen.name.clone(),
                code: Some(code),
                stderr: String::new(),
            });
        }
        self.enter(LauncherState::Done);
        Ok(LaunchOutcome::Ran {
            script: chosen.name,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::ScriptedPrompter;
    use std::cell::{Cell, RefCell};

    struct Listing {
        status: Option<u16>,
        names: Vec<&'static str>,
        downloads: Cell<u32>,
    }

    impl Listing {
        fn ok(names: Vec<&'static str>) -> Self {
            Self {
                status: None,
                names,
                downloads: Cell::new(0),
            }
        }
        fn failing(status: u16) -> Self {
            Self {
                status: Some(status),
                names: Vec::new(),
                downloads: Cell::new(0),
            }
        }
    }

    impl ScriptSource for Listing {
        fn describe(&self) -> String {
            "acme/scripts@main".to_string()
        }
        fn list(&self) -> Result<Vec<ContentEntry>, DockhandError> {
            if let Some(status) = self.status {
                return Err(DockhandError::Http {
                    status,
                    url: "https://api.example/contents".to_string(),
                });
            }
            Ok(self
                .names
                .iter()
                .map(|n| ContentEntry {
                    name: n.to_string(),
                    path: n.to_string(),
                    kind: "file".to_string(),
                    download_url: Some(format!("https://raw.example/{n}")),
                })
                .collect())
        }
        fn download(&self, script: &RemoteScript) -> Result<Vec<u8>, DockhandError> {
            self.downloads.set(self.downloads.get() + 1);
            Ok(format!("echo {}\n", script.name).into_bytes())
        }
    }

    struct Runs {
        code: i32,
        ran: RefCell<Vec<String>>,
    }

    impl Runs {
        fn new(code: i32) -> Self {
            Self {
                code,
                ran: RefCell::new(Vec::new()),
            }
        }
    }

    impl ScriptExecutor for Runs {
        fn execute(&self, script: &RemoteScript, _body: &[u8]) -> Result<i32, DockhandError> {
            self.ran.borrow_mut().push(script.name.clone());
            Ok(self.code)
        }
    }

    fn opts() -> LaunchOptions {
        LaunchOptions {
            self_name: "setup.sh".to_string(),
            ..LaunchOptions::default()
        }
    }

    #[test]
    fn http_failure_never_downloads() {
        let src = Listing::failing(404);
        let exec = Runs::new(0);
        let mut l = Launcher::new(&src, &exec, opts());
        let err = l.run(&mut ScriptedPrompter::new(Vec::<String>::new())).unwrap_err();
        assert!(matches!(err, DockhandError::Http { status: 404, .. }), "{err:?}");
        assert_eq!(src.downloads.get(), 0);
        assert_eq!(l.state(), LauncherState::Failed);
    }

    #[test]
    fn out_of_range_selection_reprompts() {
        let src = Listing::ok(vec!["b.sh", "setup.sh", "a.sh"]);
        let exec = Runs::new(0);
        let mut p = ScriptedPrompter::new(["0", "3", "x", "2", "y"]);
        let mut l = Launcher::new(&src, &exec, opts());
        let out = l.run(&mut p).unwrap();
        assert_eq!(out, LaunchOutcome::Ran { script: "b.sh".to_string() });
        assert_eq!(p.remaining(), 0);
        assert_eq!(p.shown.len(), 3);
        assert_eq!(p.messages.len(), 3);
        assert_eq!(*exec.ran.borrow(), vec!["b.sh".to_string()]);
        assert_eq!(
            l.history(),
            &[
                LauncherState::Listing,
                LauncherState::Selecting,
                LauncherState::Confirming,
                LauncherState::Executing,
                LauncherState::Done
            ]
        );
    }

    #[test]
    fn declining_is_graceful() {
        let src = Listing::ok(vec!["a.sh"]);
        let exec = Runs::new(0);
        let mut l = Launcher::new(&src, &exec, opts());
        let out = l.run(&mut ScriptedPrompter::new(["1", ""])).unwrap();
        assert_eq!(out, LaunchOutcome::Declined);
        assert_eq!(src.downloads.get(), 0);
        assert_eq!(l.state(), LauncherState::Done);
    }

    #[test]
    fn q_quits_the_menu() {
        let src = Listing::ok(vec!["a.sh"]);
        let exec = Runs::new(0);
        let mut l = Launcher::new(&src, &exec, opts());
        let out = l.run(&mut ScriptedPrompter::new(["q"])).unwrap();
        assert_eq!(out, LaunchOutcome::Declined);
    }

    #[test]
    fn child_exit_code_is_surfaced() {
        let src = Listing::ok(vec!["a.sh"]);
        let exec = Runs::new(7);
        let mut l = Launcher::new(&src, &exec, opts());
        let err = l.run(&mut ScriptedPrompter::new(["1", "y"])).unwrap_err();
        assert!(matches!(err, DockhandError::CommandFailed { code: Some(7), .. }), "{err:?}");
        assert_eq!(l.state(), LauncherState::Failed);
    }

    #[test]
    fn only_launcher_script_is_an_empty_listing() {
        let src = Listing::ok(vec!["setup.sh"]);
        let exec = Runs::new(0);
        let err = Launcher::new(&src, &exec, opts())
            .run(&mut ScriptedPrompter::new(Vec::<String>::new()))
            .unwrap_err();
        assert!(err.to_string().contains("no .sh scripts"), "{err}");
    }

    #[test]
    fn list_and_preselect() {
        let src = Listing::ok(vec!["b.sh", "a.sh"]);
        let exec = Runs::new(0);
        let listed = Launcher::new(
            &src,
            &exec,
            LaunchOptions {
                list_only: true,
                ..opts()
            },
        )
        .run(&mut ScriptedPrompter::new(Vec::<String>::new()))
        .unwrap();
        assert_eq!(
            listed,
            LaunchOutcome::Listed(vec!["a.sh".to_string(), "b.sh".to_string()])
        );

        let mut p = ScriptedPrompter::new(["y"]);
        let out = Launcher::new(
            &src,
            &exec,
            LaunchOptions {
                script: Some("b.sh".to_string()),
                ..opts()
            },
        )
        .run(&mut p)
        .unwrap();
        assert_eq!(out, LaunchOutcome::Ran { script: "b.sh".to_string() });
        assert_eq!(p.questions.len(), 1);
    }
}
