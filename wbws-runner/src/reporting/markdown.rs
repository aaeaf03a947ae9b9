//! Markdown rendering of JSON reports.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};

use wbws_core::pipeline::Stage;

use super::common::{CountPct, STRATEGY_REPORT_TYPE, TRIGGER_REPORT_TYPE};
use super::strategy_report::StrategyReport;
use super::trigger_report::TriggerReport;

fn pct(value: f64) -> String {
    format!("{value:.2}%")
}

fn or_na(s: &str) -> &str {
    if s.is_empty() {
        "N/A"
    } else {
        s
    }
}

fn count_row(out: &mut String, label: &str, c: &CountPct) {
    let _ = writeln!(out, "| {label} | {} | {} |", c.count, pct(c.percentage));
}

fn title_case(key: &str) -> String {
    key.split('_')
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

pub struct MarkdownReportGenerator;

impl MarkdownReportGenerator {
    /// Render any report JSON, dispatching on `report_metadata.report_type`.
    pub fn from_json(&self, json: &str) -> Result<String> {
        let value: serde_json::Value =
            serde_json::from_str(json).context("Report is not valid JSON")?;
        let report_type = value
            .pointer("/report_metadata/report_type")
            .and_then(|v| v.as_str())
            .unwrap_or_default()
            .to_string();

        match report_type.as_str() {
            TRIGGER_REPORT_TYPE => {
                let report: TriggerReport =
                    serde_json::from_value(value).context("Malformed trigger report")?;
                Ok(self.trigger(&report))
            }
            STRATEGY_REPORT_TYPE => {
                let report: StrategyReport =
                    serde_json::from_value(value).context("Malformed strategy report")?;
                Ok(self.strategy(&report))
            }
            other => bail!("Unknown report type '{other}'"),
        }
    }

    pub fn trigger(&self, r: &TriggerReport) -> String {
        let cfg = &r.configuration;
        let mut md = String::new();

        let _ = writeln!(md, "# WBWS Signal Report: {}\n", or_na(&cfg.asset.symbol));
        let _ = writeln!(md, "**Configuration:** {}  ", cfg.name);
        let _ = writeln!(md, "**Run:** `{}`  ", r.report_metadata.run_id);
        let _ = writeln!(md, "**Generated at:** {}\n", r.report_metadata.generated_at.to_rfc3339());

        self.configuration_section(&mut md, r);
        self.preprocessing_section(&mut md, &r.data_preprocessing);

        let ex = &r.execution;
        md.push_str("## Execution Summary\n\n");
        let _ = writeln!(md, "- **Total Bars:** {}", ex.total_bars);
        let _ = writeln!(md, "- **HTF Buckets:** {}", ex.htf_buckets);
        let _ = writeln!(md, "- **Buy Signals:** {}", ex.signals.buy);
        let _ = writeln!(md, "- **Sell Signals:** {}", ex.signals.sell);
        let _ = writeln!(md, "- **Total Signals:** {}\n", ex.signals.total);

        let sig = &r.signal_analysis;
        md.push_str("## Signal Distribution\n\n");
        md.push_str("| Type | Count | Percentage |\n|------|------:|-----------:|\n");
        count_row(&mut md, "Buy", &sig.buy_signals);
        count_row(&mut md, "Sell", &sig.sell_signals);
        let _ = writeln!(
            md,
            "| **Total** | **{}** | **{}** |\n",
            sig.total_signals.count,
            pct(sig.total_signals.percentage)
        );

        let candles = &r.candle_distribution;
        md.push_str("## Candle Classification\n\n");
        let _ = writeln!(
            md,
            "Classification rate: **{}**\n",
            pct(candles.classification_rate)
        );
        md.push_str("| Type | Count | Percentage |\n|------|------:|-----------:|\n");
        for (key, c) in &candles.distribution {
            count_row(&mut md, &title_case(key), c);
        }
        md.push('\n');

        let htf = &r.htf_analysis;
        let _ = writeln!(md, "## HTF Bias ({})\n", ex.htf_period);
        md.push_str("| State | Count | Percentage |\n|-------|------:|-----------:|\n");
        count_row(&mut md, "Bullish", &htf.htf_bull_bars);
        count_row(&mut md, "Bearish", &htf.htf_bear_bars);
        count_row(&mut md, "Neutral", &htf.htf_neutral_bars);
        md.push('\n');

        let rev = &r.reversal_patterns;
        md.push_str("## Reversal Pattern Efficiency\n\n");
        md.push_str("| Pattern | Count | Converted | Conversion Rate |\n");
        md.push_str("|--------|------:|----------:|----------------:|\n");
        let _ = writeln!(
            md,
            "| 2D → 2U | {} | {} Buy | {} |",
            rev.reversals_2d_to_2u.count,
            rev.reversals_2d_to_2u.converted,
            pct(rev.reversals_2d_to_2u.conversion_rate)
        );
        let _ = writeln!(
            md,
            "| 2U → 2D | {} | {} Sell | {} |",
            rev.reversals_2u_to_2d.count,
            rev.reversals_2u_to_2d.converted,
            pct(rev.reversals_2u_to_2d.conversion_rate)
        );

        let samples = &r.sample_signals;
        if !samples.buy_samples.is_empty() || !samples.sell_samples.is_empty() {
            md.push_str("\n## Sample Signals\n\n");
            md.push_str("| Side | Timestamp | Open | High | Low | Close |\n");
            md.push_str("|------|-----------|-----:|-----:|----:|------:|\n");
            let sides = [("Buy", &samples.buy_samples), ("Sell", &samples.sell_samples)];
            for (side, list) in sides {
                for s in list {
                    let _ = writeln!(
                        md,
                        "| {side} | {} | {:.2} | {:.2} | {:.2} | {:.2} |",
                        s.timestamp, s.open, s.high, s.low, s.close
                    );
                }
            }
        }

        md
    }

    pub fn strategy(&self, r: &StrategyReport) -> String {
        let cfg = &r.configuration;
        let c = &r.counts;
        let mut md = String::new();

        let _ = writeln!(md, "# WBWS Strategy Report: {}\n", or_na(&cfg.asset.symbol));
        let _ = writeln!(md, "**Configuration:** {}  ", cfg.name);
        let _ = writeln!(md, "**Run:** `{}`  ", r.report_metadata.run_id);
        let _ = writeln!(md, "**Generated at:** {}\n", r.report_metadata.generated_at.to_rfc3339());

        self.preprocessing_section(&mut md, &r.data_preprocessing);

        md.push_str("## Final Signal Split\n\n");
        md.push_str("| Side | Raw | Final | Rejected |\n|------|----:|------:|---------:|\n");
        let _ = writeln!(md, "| Buy | {} | {} | {} |", c.raw_buy, c.final_buy, c.rejected_buy());
        let _ = writeln!(md, "| Sell | {} | {} | {} |", c.raw_sell, c.final_sell, c.rejected_sell());
        let _ = writeln!(md, "\nStops adjusted to the risk cap: **{}**\n", c.adjusted);

        md.push_str("## Stages\n\n");
        md.push_str("| Stage | In | Passed | Rejected |\n|-------|---:|-------:|---------:|\n");
        for stage in Stage::ALL {
            let s = r.stages.stage(stage);
            let _ = writeln!(
                md,
                "| {} | {} | {} | {} |",
                title_case(stage.label()),
                s.input.total(),
                s.approved.total(),
                s.rejected.total()
            );
        }

        if !r.stages.rejection_reasons.is_empty() {
            md.push_str("\n### Rejection Reasons\n\n");
            for (reason, n) in &r.stages.rejection_reasons {
                let _ = writeln!(md, "- {reason}: {n}");
            }
        }

        if !r.trades.is_empty() {
            md.push_str("\n## Trades\n\n");
            md.push_str("| Timestamp | Side | Entry | Stop | Target | Comment |\n");
            md.push_str("|-----------|------|------:|-----:|-------:|---------|\n");
            for t in &r.trades {
                let _ = writeln!(
                    md,
                    "| {} | {} | {:.2} | {:.2} | {:.2} | {} |",
                    t.timestamp,
                    t.direction.label(),
                    t.entry_price,
                    t.stop_loss,
                    t.take_profit,
                    t.comment
                );
            }
        }

        md
    }

    fn configuration_section(&self, md: &mut String, r: &TriggerReport) {
        let cfg = &r.configuration;
        md.push_str("## Configuration\n\n### Asset\n");
        let _ = writeln!(md, "- **Symbol:** {}", or_na(&cfg.asset.symbol));
        let _ = writeln!(md, "- **Name:** {}", or_na(&cfg.asset.name));
        let _ = writeln!(md, "- **Exchange:** {}", or_na(&cfg.asset.exchange));
        let _ = writeln!(md, "- **Currency:** {}\n", or_na(&cfg.asset.currency));

        md.push_str("### Data Source\n");
        let _ = writeln!(md, "- **File:** {}", cfg.data.file);
        let _ = writeln!(md, "- **Timeframe:** {}", cfg.data.timeframe);
        let _ = writeln!(md, "- **Format:** {}\n", cfg.data.format);

        md.push_str("### Indicator\n");
        let _ = writeln!(md, "- **Higher Timeframe:** {}\n", r.execution.htf_period);
    }

    fn preprocessing_section(
        &self,
        md: &mut String,
        prep: &crate::data_loader::PreprocessingInfo,
    ) {
        md.push_str("## Data Preprocessing\n\n");
        let _ = writeln!(md, "- **Rows:** {}", prep.rows);
        if let Some(p) = &prep.period {
            let _ = writeln!(md, "- **Period:** {} → {}", p.start, p.end);
        }
        md.push_str("\n### Validation Steps\n");
        for step in &prep.preprocessing_steps {
            let _ = writeln!(md, "- {step}");
        }
        md.push('\n');
    }
}

/// Convert a JSON report file to Markdown. Without `output`, writes next to the input.
pub fn convert_report_file(input: &Path, output: Option<&Path>) -> Result<PathBuf> {
    let json = std::fs::read_to_string(input)
        .with_context(|| format!("Failed to read report {}", input.display()))?;
    let md = MarkdownReportGenerator.from_json(&json)?;
    let out = output
        .map(Path::to_path_buf)
        .unwrap_or_else(|| input.with_extension("md"));
    std::fs::write(&out, md)
        .with_context(|| format!("Failed to write Markdown {}", out.display()))?;
    Ok(out)
}
