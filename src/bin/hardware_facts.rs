/*
Copyright 2024 San Francisco Compute Company

Licensed under the Apache License, Version 2.0 (the "License");
you may not use this file except in compliance with the License.
You may obtain a copy of the License at

    http://www.apache.org/licenses/LICENSE-2.0

Unless required by applicable law or agreed to in writing, software
distributed under the License is distributed on an "AS IS" BASIS,
WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
See the License for the specific language governing permissions and
limitations under the License.
*/

//! Command line interface for fact collection

use clap::{Parser, ValueEnum};
use hardware_facts::{
    CollectConfig, ContainerConfig, FactName, FactReport, FactValue, Record, ServiceContainer,
};
use std::collections::BTreeMap;
use std::error::Error;
use std::time::Duration;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum FactArg {
    Fibrechannel,
    Ipmi,
    Lldp,
}

impl From<FactArg> for FactName {
    fn from(arg: FactArg) -> Self {
        match arg {
            FactArg::Fibrechannel => FactName::Fibrechannel,
            FactArg::Ipmi => FactName::Ipmi,
            FactArg::Lldp => FactName::Lldp,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    Json,
    Text,
}

#[derive(Parser)]
#[command(name = "hardware_facts")]
#[command(about = "Extract structured facts from system inventory tools")]
struct Cli {
    /// Facts to collect; may be repeated (default: all)
    #[arg(long = "fact", value_enum)]
    facts: Vec<FactArg>,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
    output: OutputFormat,

    /// Compact JSON instead of pretty-printed
    #[arg(long)]
    compact: bool,

    /// Skip the Linux/physical-hardware confinement checks
    #[arg(long)]
    no_confine: bool,

    /// Per-command timeout in seconds
    #[arg(long, default_value_t = 30)]
    timeout: u64,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();
    let cli = Cli::parse();

    let container = ServiceContainer::new(
        ContainerConfig::builder()
            .command_timeout(Duration::from_secs(cli.timeout))
            .build(),
    );

    let facts = if cli.facts.is_empty() {
        FactName::ALL.to_vec()
    } else {
        cli.facts.iter().copied().map(FactName::from).collect()
    };
    let config = CollectConfig {
        facts,
        confine: !cli.no_confine,
    };

    let report = container.fact_service().collect(&config).await?;

    match cli.output {
        OutputFormat::Json if cli.compact => println!("{}", serde_json::to_string(&report)?),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
        OutputFormat::Text => print!("{}", render_text(&report)),
    }

    Ok(())
}

/// Render the report as indented key/value text, one block per record
fn render_text(report: &FactReport) -> String {
    let mut out = String::new();

    if let Some(fc) = &report.fibrechannel {
        out.push_str("fibrechannel:\n");
        render_keyed(&mut out, &fc.hosts);
    }
    if let Some(ipmi) = &report.ipmi {
        out.push_str("ipmi:\n");
        for (index, channel) in ipmi.channels.iter().enumerate() {
            out.push_str(&format!("  [{index}]\n"));
            render_record(&mut out, channel);
        }
    }
    if let Some(lldp) = &report.lldp {
        out.push_str("lldp:\n");
        render_keyed(&mut out, &lldp.neighbors);
    }

    out
}

fn render_keyed(out: &mut String, records: &BTreeMap<String, Record>) {
    for (id, record) in records {
        out.push_str(&format!("  {id}\n"));
        render_record(out, record);
    }
}

fn render_record(out: &mut String, record: &Record) {
    for (key, value) in record {
        match value {
            FactValue::Text(text) => out.push_str(&format!("    {key} = {text}\n")),
            FactValue::List(items) => {
                out.push_str(&format!("    {key} = {}\n", items.join(", ")))
            }
            FactValue::Null => out.push_str(&format!("    {key} =\n")),
        }
    }
}
