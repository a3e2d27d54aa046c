use crate::cli::{CommonArgs, OutputArgs};
use crate::output::Sink;
use crate::report::write_trend;
use crate::run::analyze;

pub fn exec(common: &CommonArgs, output: &OutputArgs, quiet: bool) -> anyhow::Result<()> {
    let format = output.format();
    let Some(analysis) = analyze(common, None, true, !quiet && !format.is_machine_readable())? else {
        return Ok(());
    };
    let buckets = analysis.report.months.unwrap_or_default();

    let mut sink = Sink::open(output.output.as_deref())?;
    let styled = sink.supports_style();
    write_trend(sink.writer(), format, &analysis.meta, &buckets, styled)?;
    sink.finish()
}
