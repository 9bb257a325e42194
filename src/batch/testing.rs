//! Scripted [`Runner`] for engine tests.
//!
//! Emulates the external tools on plain text files:
//!
//! - `convert <opts> <in> <out>` writes `"<opts> | <content of in>"` to `out`
//! - `convert -trim -verbose <in> <out>` writes `out` and answers with the
//!   canned report registered for the file name of `in`
//! - `rsvg-convert -b <bg> <in> -o <out>` writes `"raster(<bg>) | <content of in>"`

use std::{
    cell::RefCell,
    collections::HashMap,
    ffi::{OsStr, OsString},
    fs,
    path::{Path, PathBuf},
};

use crate::config::ToolsConfig;
use crate::utils::exec::{Cmd, ExecError, Runner};
use crate::utils::tool::ToolAvailability;

pub fn tools() -> ToolsConfig {
    ToolsConfig {
        convert: vec!["convert".into()],
        rsvg: vec!["rsvg-convert".into()],
    }
}

#[derive(Default)]
pub struct ScriptedRunner {
    missing_tools: bool,
    fail_on: Option<String>,
    reports: HashMap<String, String>,
    commands: RefCell<Vec<String>>,
}

impl ScriptedRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn without_tools() -> Self {
        Self {
            missing_tools: true,
            ..Self::default()
        }
    }

    /// Fail every command whose input has this file name.
    pub fn fail_on(mut self, name: &str) -> Self {
        self.fail_on = Some(name.to_string());
        self
    }

    /// Register the `-trim -verbose` output for a file name.
    pub fn report(mut self, name: &str, output: impl Into<String>) -> Self {
        self.reports.insert(name.to_string(), output.into());
        self
    }

    /// Register a well-formed trim report built from its geometry fields.
    pub fn trim_report(self, name: &str, geometry: &str) -> Self {
        let output = format!(
            "{name} PNG 640x480 640x480+0+0 8-bit sRGB 2KB\n\
             {name}=>tmp.png PNG 640x480=>{geometry} 8-bit sRGB 0.010u\n"
        );
        self.report(name, output)
    }

    /// Every command line run so far.
    pub fn commands(&self) -> Vec<String> {
        self.commands.borrow().clone()
    }

    fn fail(&self, cmd: &Cmd, input: &Path) -> Result<(), ExecError> {
        let name = file_name(input);
        if self.fail_on.as_deref() == Some(name.as_str()) {
            return Err(ExecError::Process {
                command: cmd.to_string(),
                status: "exit status: 1".into(),
                output: format!("unable to open image `{name}'"),
            });
        }
        Ok(())
    }
}

impl Runner for ScriptedRunner {
    fn run(&self, cmd: &Cmd) -> Result<String, ExecError> {
        self.commands.borrow_mut().push(cmd.to_string());
        let io_err = |source| ExecError::Spawn {
            command: cmd.to_string(),
            source,
        };
        let args: Vec<&OsString> = cmd.get_args().iter().collect();
        let is_rsvg = cmd.program() == OsStr::new("rsvg-convert");

        let (input, output) = if is_rsvg {
            let out = args.iter().position(|a| *a == "-o").expect("rsvg without -o");
            (PathBuf::from(args[out - 1]), PathBuf::from(args[out + 1]))
        } else {
            let n = args.len();
            (PathBuf::from(args[n - 2]), PathBuf::from(args[n - 1]))
        };

        self.fail(cmd, &input)?;
        let content = fs::read_to_string(&input).map_err(io_err)?;

        if args.iter().any(|a| *a == "-trim") {
            fs::write(&output, &content).map_err(io_err)?;
            let name = file_name(&input);
            return Ok(self.reports.get(&name).cloned().unwrap_or_default());
        }

        let opts: Vec<String> = if is_rsvg {
            vec![format!("raster({})", args[1].to_string_lossy())]
        } else {
            args[..args.len() - 2]
                .iter()
                .map(|a| a.to_string_lossy().into_owned())
                .filter(|a| a != "convert")
                .collect()
        };
        fs::write(&output, format!("{} | {content}", opts.join(" "))).map_err(io_err)?;
        Ok(String::new())
    }

    fn locate(&self, program: &OsStr) -> ToolAvailability {
        if self.missing_tools {
            ToolAvailability::Missing
        } else {
            ToolAvailability::Found(Path::new("/usr/bin").join(program))
        }
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}
