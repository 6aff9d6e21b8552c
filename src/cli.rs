//! CLI: create (schema-driven prompting → manifest) | fields (schema view)
use std::fs::File;
use std::io::{self, Write};
use std::path::{Path as FsPath, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};

use crate::collect::assignments::parse_assignments;
use crate::collect::{CollectConfig, collect};
use crate::document::ValueMap;
use crate::error::Error;
use crate::identity::ResourceIdentity;
use crate::manifest::{OutputFormat, build, render};
use crate::prompt::{NonInteractive, Prompter, TerminalPrompter};
use crate::schema::{SchemaTree, TypeGraph, extract_resource};
use crate::submit::{CreationBoundary, ManifestSink};
use crate::value::Document;

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

/// create resources interactively, driven by their OpenAPI schema
#[derive(Parser, Debug)]
#[command(name = "kubectl-create-resource", version)]
pub struct CommandLineInterface {
    /// more diagnostics on stderr (-v info, -vv debug, -vvv trace); RUST_LOG overrides
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// collect field values and emit the resulting manifest
    Create(CreateOut),
    /// print the extracted field tree (prompting order) as JSON
    Fields(FieldsOut),
}

#[derive(Args, Debug, Clone)]
struct SchemaSettings {
    /// resource type as <resource>[.<group>]/<version>, e.g. deployments.apps/v1
    resource: String,

    /// kind override when it cannot be derived from the resource name
    #[arg(long)]
    kind: Option<String>,

    /// OpenAPI v3 / Swagger v2 schema documents. May be literal paths or quoted glob patterns
    ///
    /// Without a schema (or when the type is not found) only the basic
    /// metadata shape is used.
    #[arg(long, num_args = 1..)]
    schema: Vec<String>,
}

#[derive(clap::Parser, Debug)]
struct CreateOut {
    #[command(flatten)]
    schema_settings: SchemaSettings,

    /// existing object (YAML or JSON) to use as a template
    #[arg(long)]
    from: Option<PathBuf>,

    /// jq filter applied to the template before use
    #[arg(long, requires = "from")]
    template_filter: Option<String>,

    /// field assignment <path>=<value>, e.g. spec.replicas=3 (repeatable)
    #[arg(long = "set", value_name = "PATH=VALUE")]
    assignments: Vec<String>,

    /// resource name
    #[arg(long)]
    name: Option<String>,

    /// namespace; empty for cluster-scoped resources
    #[arg(short, long, default_value = "default")]
    namespace: String,

    /// print the manifest as yaml or json instead of creating (implies --dry-run)
    #[arg(short, long)]
    output: Option<String>,

    /// print the manifest instead of creating
    #[arg(long)]
    dry_run: bool,

    /// never prompt; defaults apply and missing values stay unset
    #[arg(long)]
    no_input: bool,

    /// output file (stdout if omitted)
    #[arg(long)]
    out: Option<PathBuf>,
}

#[derive(clap::Parser, Debug)]
struct FieldsOut {
    #[command(flatten)]
    schema_settings: SchemaSettings,

    /// output .json file (stdout if omitted)
    #[arg(long)]
    out: Option<PathBuf>,
}

/// Immutable run configuration derived from `create` arguments.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub identity: ResourceIdentity,
    pub namespace: Option<String>,
    pub collect: CollectConfig,
    /// `Some` for a dry run: print in this format and create nothing.
    pub preview: Option<OutputFormat>,
    pub interactive: bool,
}

// ————————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ————————————————————————————————————————————————————————————————————————————

impl SchemaSettings {
    fn identity(&self) -> Result<ResourceIdentity, Error> {
        Ok(ResourceIdentity::parse(&self.resource, self.kind.as_deref())?)
    }

    /// Loads and merges every schema file; later files override same-named types.
    fn load_graph(&self) -> Result<TypeGraph> {
        let mut graph = TypeGraph::default();
        for source_path in resolve_file_path_patterns(&self.schema)? {
            let source = std::fs::read_to_string(&source_path)
                .with_context(|| format!("failed to read schema file {}", source_path.display()))?;
            let part = TypeGraph::from_document(&source)
                .map_err(Error::from)
                .with_context(|| format!("failed to load schema file {}", source_path.display()))?;
            tracing::info!(file = %source_path.display(), types = part.len(), "loaded schema");
            graph.merge(part);
        }
        Ok(graph)
    }

    fn tree(&self, identity: &ResourceIdentity) -> Result<SchemaTree> {
        let graph = self.load_graph()?;
        Ok(extract_resource(&graph, identity))
    }
}

impl CreateOut {
    fn config(&self) -> Result<RunConfig, Error> {
        let identity = self.schema_settings.identity()?;
        let overrides = parse_assignments(&self.assignments)?;
        let preview = match self.output.as_deref() {
            Some(format) => Some(format.parse::<OutputFormat>()?),
            None if self.dry_run => Some(OutputFormat::Yaml),
            None => None,
        };
        let namespace = Some(self.namespace.trim())
            .filter(|ns| !ns.is_empty())
            .map(str::to_string);
        Ok(RunConfig {
            identity,
            namespace,
            collect: CollectConfig { name: self.name.clone(), overrides },
            preview,
            interactive: !self.no_input,
        })
    }

    fn load_seed(&self, config: &RunConfig) -> Result<Option<ValueMap>> {
        let Some(source_path) = self.from.as_ref() else { return Ok(None) };
        let mut doc = load_template(source_path)?;
        if let Some(filter) = self.template_filter.as_deref() {
            doc = crate::jq_exec::filter_template(filter, &doc)
                .map_err(Error::from)
                .with_context(|| format!("failed to apply template filter to {}", source_path.display()))?;
        }
        Ok(Some(crate::template::seed(
            doc,
            config.collect.name.as_deref(),
            config.namespace.as_deref(),
        )))
    }

    fn run(&self) -> Result<()> {
        // 1) validate every input before any prompting
        let config = self.config()?;
        let tree = self.schema_settings.tree(&config.identity)?;
        let seed = self.load_seed(&config)?;

        // 2) collect
        let mut terminal;
        let mut quiet = NonInteractive;
        let prompter: &mut dyn Prompter = if config.interactive {
            terminal = TerminalPrompter::stdin();
            &mut terminal
        } else {
            &mut quiet
        };
        let collected = collect(&tree, seed.as_ref(), &config.collect, prompter).map_err(Error::from)?;

        // 3) build & emit
        let doc = build(&config.identity, &collected.name, config.namespace.as_deref(), &collected.values);
        match config.preview {
            Some(format) => {
                let src = render(&doc, format).map_err(Error::from)?;
                write_output(self.out.as_deref(), &src)?;
            }
            None => {
                let out = open_output(self.out.as_deref())?;
                let mut sink = ManifestSink::new(out, OutputFormat::Yaml);
                let created: Document = sink
                    .create(&config.identity, config.namespace.as_deref(), doc)
                    .map_err(Error::from)?;
                let name = created
                    .get("metadata")
                    .and_then(|m| m.as_map())
                    .and_then(|m| m.get("name"))
                    .and_then(|n| n.as_str())
                    .unwrap_or(&collected.name);
                eprintln!("{}/{} created", config.identity.resource, name);
            }
        }
        Ok(())
    }
}

impl FieldsOut {
    fn run(&self) -> Result<()> {
        let identity = self.schema_settings.identity()?;
        let tree = self.schema_settings.tree(&identity)?;
        let src = serde_json::to_string_pretty(&tree)?;
        write_output(self.out.as_deref(), &format!("{src}\n"))
    }
}

impl CommandLineInterface {
    pub fn load() -> Self {
        Self::parse()
    }
    pub fn verbosity(&self) -> u8 {
        self.verbose
    }
    pub fn run(&self) -> Result<()> {
        match &self.cmd {
            Command::Create(target) => target.run(),
            Command::Fields(target) => target.run(),
        }
    }
}

// ————————————————————————————————————————————————————————————————————————————
// INTERNAL HELPERS
// ————————————————————————————————————————————————————————————————————————————

/// JSON files keep path context in parse errors; anything else is read as YAML.
fn load_template(source_path: &FsPath) -> Result<Document> {
    let source = std::fs::read_to_string(source_path)
        .with_context(|| format!("failed to read template {}", source_path.display()))?;
    let is_json = source_path.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    let doc = if is_json {
        crate::path_de::from_str_with_path::<Document>(&source)
            .with_context(|| format!("failed to parse template {}", source_path.display()))?
    } else {
        serde_yaml::from_str::<Document>(&source)
            .with_context(|| format!("failed to parse template {}", source_path.display()))?
    };
    Ok(doc)
}

fn open_output(out: Option<&FsPath>) -> Result<Box<dyn Write>> {
    match out {
        Some(out) => {
            if let Some(parent) = out.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("failed to create {}", parent.display()))?;
            }
            let file = File::create(out).with_context(|| format!("failed to create {}", out.display()))?;
            Ok(Box::new(file))
        }
        None => Ok(Box::new(io::stdout().lock())),
    }
}

fn write_output(out: Option<&FsPath>, src: &str) -> Result<()> {
    let mut sink = open_output(out)?;
    sink.write_all(src.as_bytes())?;
    sink.flush()?;
    Ok(())
}

fn resolve_file_path_patterns<I>(patterns: I) -> Result<Vec<PathBuf>>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    fn has_glob_chars(s: &str) -> bool {
        s.bytes().any(|b| matches!(b, b'*' | b'?' | b'[' | b'{'))
    }

    let mut out = Vec::<PathBuf>::new();

    for raw in patterns {
        let pattern = raw.as_ref();

        if has_glob_chars(pattern) {
            let mut matched_any = false;
            for entry in glob::glob(pattern).with_context(|| format!("invalid glob pattern {pattern}"))? {
                out.push(entry?);
                matched_any = true;
            }
            if !matched_any {
                bail!("glob pattern matched no files: {pattern}");
            }
        } else {
            out.push(PathBuf::from(pattern));
        }
    }

    Ok(out)
}
