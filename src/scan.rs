use crate::cli::{CommonArgs, OutputArgs};
use crate::output::Sink;
use crate::report::write_hotspots;
use crate::run::analyze;

pub fn exec(common: &CommonArgs, top: usize, output: &OutputArgs, quiet: bool) -> anyhow::Result<()> {
    let format = output.format();
    let Some(analysis) = analyze(common, Some(top), false, !quiet && !format.is_machine_readable())? else {
        return Ok(());
    };

    let mut sink = Sink::open(output.output.as_deref())?;
    let styled = sink.supports_style();
    write_hotspots(sink.writer(), format, &analysis.meta, &analysis.report, styled)?;
    sink.finish()
}
