//! Makeflow generation.
//!
//! Builds the rule set for N independent simulation tasks plus one join
//! rule and renders it in makeflow syntax.

use crate::config::FlowConfig;
use crate::error::{PythiaError, Result};
use std::fmt;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::{debug, info};

/// Variable naming the shared dataset.
const SETTINGS_VAR: &str = "PYTHIASETTINGS";

/// Variable holding the absolute command file path.
const COMMAND_VAR: &str = "COMMAND";

/// A single makeflow rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule {
    /// File the rule produces
    pub target: String,

    /// Files that must exist before the recipe runs
    pub dependencies: Vec<String>,

    /// Shell command producing the target
    pub recipe: String,
}

impl Rule {
    /// Creates a rule.
    pub fn new(target: impl Into<String>, dependencies: Vec<String>, recipe: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            dependencies,
            recipe: recipe.into(),
        }
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}: {}", self.target, self.dependencies.join(" "))?;
        writeln!(f, "\t{}", self.recipe)
    }
}

/// A complete flow: header variables followed by rules.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlowDescription {
    /// Shared dataset name
    pub settings_archive: String,

    /// Absolute command file path, resolved at build time
    pub command_path: String,

    /// Marker and simulation rules per task, then the join rule
    pub rules: Vec<Rule>,
}

impl FlowDescription {
    /// Builds the flow for `config`, anchoring the command file at `working_dir`.
    ///
    /// A non-positive task count yields only the join rule, with no
    /// dependencies beyond the joiner itself.
    pub fn build(config: &FlowConfig, working_dir: &Path) -> Self {
        let task_count = task_range_end(config.task_count);
        let mut rules = Vec::with_capacity(2 * task_count as usize + 1);

        for index in 0..task_count {
            let marker = marker_target(index);
            let sim = sim_target(index);

            rules.push(Rule::new(
                marker.clone(),
                Vec::new(),
                format!("touch {}", marker),
            ));
            rules.push(Rule::new(
                sim.clone(),
                vec![
                    config.settings_archive.clone(),
                    config.executable.clone(),
                    config.command_file.clone(),
                    marker.clone(),
                ],
                format!(
                    "tar xf {archive} && ls -l >> {marker} && ./{exe} {cmd} {sim} >> {marker}",
                    archive = config.settings_archive,
                    marker = marker,
                    exe = config.executable,
                    cmd = config.command_file,
                    sim = sim,
                ),
            ));
        }

        let mut join_deps = Vec::with_capacity(task_count as usize + 1);
        join_deps.push(config.joiner.clone());
        join_deps.extend((0..task_count).map(sim_target));
        rules.push(Rule::new(
            "final",
            join_deps,
            format!("./{} {}", config.joiner, config.task_count),
        ));

        Self {
            settings_archive: config.settings_archive.clone(),
            command_path: working_dir.join(&config.command_file).display().to_string(),
            rules,
        }
    }

    /// Number of simulation rules declared.
    pub fn task_count(&self) -> usize {
        self.sim_targets().count()
    }

    /// Simulation targets in index order, as listed by the join rule.
    pub fn sim_targets(&self) -> impl Iterator<Item = &str> {
        self.join_rule()
            .into_iter()
            .flat_map(|rule| rule.dependencies.iter().skip(1))
            .map(String::as_str)
    }

    /// The final aggregation rule.
    pub fn join_rule(&self) -> Option<&Rule> {
        self.rules.last()
    }

    /// Renders the flow to a string.
    pub fn render(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for FlowDescription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}={}", SETTINGS_VAR, self.settings_archive)?;
        writeln!(f, "{}={}", COMMAND_VAR, self.command_path)?;
        for rule in &self.rules {
            write!(f, "{}", rule)?;
        }
        Ok(())
    }
}

fn task_range_end(task_count: i64) -> u64 {
    task_count.max(0) as u64
}

fn marker_target(index: u64) -> String {
    format!("log{}", index)
}

fn sim_target(index: u64) -> String {
    format!("sim{}", index)
}

/// Generates makeflow files from a [`FlowConfig`].
pub struct FlowGenerator {
    config: FlowConfig,
}

impl FlowGenerator {
    /// Creates a generator.
    pub fn new(config: FlowConfig) -> Self {
        Self { config }
    }

    /// Returns the configuration.
    pub fn config(&self) -> &FlowConfig {
        &self.config
    }

    /// Builds the flow against the current working directory.
    ///
    /// The directory is read once here and baked into the `COMMAND` line,
    /// so the generated file only resolves from where it was generated.
    pub fn describe(&self) -> Result<FlowDescription> {
        let cwd = std::env::current_dir().map_err(|e| PythiaError::io(".", e))?;
        Ok(FlowDescription::build(&self.config, &cwd))
    }

    /// Writes the flow to an arbitrary sink.
    pub fn write_to<W: Write>(&self, flow: &FlowDescription, mut writer: W) -> std::io::Result<()> {
        writer.write_all(flow.render().as_bytes())?;
        writer.flush()
    }

    /// Builds the flow and writes it to the configured output path,
    /// replacing any previous content.
    pub fn generate(&self) -> Result<FlowDescription> {
        let flow = self.describe()?;
        let path = &self.config.output_path;

        for rule in &flow.rules {
            debug!("rule {} <- [{}]", rule.target, rule.dependencies.join(" "));
        }

        let file = File::create(path).map_err(|e| PythiaError::io(path, e))?;
        self.write_to(&flow, BufWriter::new(file))
            .map_err(|e| PythiaError::io(path, e))?;

        info!(
            "Wrote {} with {} simulation tasks",
            path.display(),
            flow.task_count()
        );
        Ok(flow)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::path::PathBuf;

    fn config(task_count: i64) -> FlowConfig {
        FlowConfig {
            task_count,
            ..Default::default()
        }
    }

    #[test]
    fn test_two_task_flow() {
        let flow = FlowDescription::build(&config(2), Path::new("/work"));

        let expected = "\
PYTHIASETTINGS=xmldoc.tar
COMMAND=/work/command.cmnd
log0: 
\ttouch log0
sim0: xmldoc.tar main42_new command.cmnd log0
\ttar xf xmldoc.tar && ls -l >> log0 && ./main42_new command.cmnd sim0 >> log0
log1: 
\ttouch log1
sim1: xmldoc.tar main42_new command.cmnd log1
\ttar xf xmldoc.tar && ls -l >> log1 && ./main42_new command.cmnd sim1 >> log1
final: join-logs sim0 sim1
\t./join-logs 2
";
        assert_eq!(flow.render(), expected);
    }

    #[test]
    fn test_zero_tasks_only_join_rule() {
        let flow = FlowDescription::build(&config(0), Path::new("/work"));

        assert_eq!(flow.rules.len(), 1);
        assert_eq!(flow.task_count(), 0);
        assert!(flow.render().ends_with("final: join-logs\n\t./join-logs 0\n"));
    }

    #[test]
    fn test_negative_tasks_accepted() {
        let flow = FlowDescription::build(&config(-3), Path::new("/work"));

        assert_eq!(flow.task_count(), 0);
        assert_eq!(flow.join_rule().unwrap().recipe, "./join-logs -3");
    }

    #[test]
    fn test_custom_names_flow_through() {
        let config = FlowConfig {
            task_count: 1,
            settings_archive: "cards.tar".to_string(),
            executable: "coalescence".to_string(),
            command_file: "run.cmnd".to_string(),
            joiner: "merge".to_string(),
            output_path: PathBuf::from("x.makeflow"),
        };
        let flow = FlowDescription::build(&config, Path::new("/data"));

        assert_eq!(flow.command_path, "/data/run.cmnd");
        assert_eq!(
            flow.rules[1].dependencies,
            vec!["cards.tar", "coalescence", "run.cmnd", "log0"]
        );
        assert_eq!(flow.join_rule().unwrap().dependencies, vec!["merge", "sim0"]);
    }

    #[test]
    fn test_generate_writes_file() {
        let dir = std::env::temp_dir().join(format!("pythia-flow-{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        let output = dir.join("pythia.makeflow");
        std::fs::write(&output, "stale content that must disappear").unwrap();

        let generator = FlowGenerator::new(FlowConfig {
            task_count: 3,
            output_path: output.clone(),
            ..Default::default()
        });
        let flow = generator.generate().unwrap();

        let written = std::fs::read_to_string(&output).unwrap();
        assert_eq!(written, flow.render());
        assert!(!written.contains("stale"));

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_unwritable_output_is_io_error() {
        let generator = FlowGenerator::new(FlowConfig {
            output_path: PathBuf::from("/nonexistent/dir/pythia.makeflow"),
            ..Default::default()
        });
        assert!(matches!(generator.generate(), Err(PythiaError::Io { .. })));
    }

    proptest! {
        #[test]
        fn prop_rule_pairs_match_task_count(n in 0i64..64) {
            let flow = FlowDescription::build(&config(n), Path::new("/work"));

            prop_assert_eq!(flow.rules.len() as i64, 2 * n + 1);
            let expected: Vec<String> = (0..n).map(|i| format!("sim{}", i)).collect();
            let listed: Vec<&str> = flow.sim_targets().collect();
            prop_assert_eq!(listed, expected.iter().map(String::as_str).collect::<Vec<_>>());

            for (i, pair) in flow.rules[..flow.rules.len() - 1].chunks(2).enumerate() {
                prop_assert_eq!(&pair[0].target, &format!("log{}", i));
                prop_assert_eq!(&pair[1].target, &format!("sim{}", i));
            }
        }

        #[test]
        fn prop_render_is_deterministic(n in -4i64..32) {
            let a = FlowDescription::build(&config(n), Path::new("/work")).render();
            let b = FlowDescription::build(&config(n), Path::new("/work")).render();
            prop_assert_eq!(a, b);
        }
    }
}
