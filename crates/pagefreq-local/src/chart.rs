//! Chart-kind dispatch: one ranked table, seven encodings.

use crate::config::ChartConfig;
use pagefreq_core::chart::{FREQUENCY_FIELD, WORD_FIELD};
use pagefreq_core::{
    CartesianAxes, ChartEncoding, ChartKind, ChartSpec, FontSpec, Mark, RankedTopTable, Result,
};

/// Relative hole radius for donut charts.
pub const DONUT_HOLE: f32 = 0.3;

/// `max(1, max_frequency / max_gridlines)`, so a chart never shows much more
/// than `max_gridlines` horizontal rules.
pub fn y_tick_interval(max_frequency: u64, max_gridlines: u64) -> u64 {
    (max_frequency / max_gridlines.max(1)).max(1)
}

/// Tick positions `0, step, 2*step, ...` not exceeding `max_frequency`.
pub fn y_tick_values(max_frequency: u64, step: u64) -> Vec<u64> {
    (0..=max_frequency).step_by(step.max(1) as usize).collect()
}

fn cartesian(mark: Mark, table: &RankedTopTable, cfg: &ChartConfig) -> ChartEncoding {
    let max = table.max_frequency();
    let step = y_tick_interval(max, cfg.max_gridlines);
    ChartEncoding::Cartesian {
        mark,
        x_field: WORD_FIELD.to_string(),
        y_field: FREQUENCY_FIELD.to_string(),
        axes: CartesianAxes {
            y_tick_interval: step,
            y_tick_values: y_tick_values(max, step),
            x_tick_angle: cfg.x_tick_angle,
        },
        font: font(cfg),
    }
}

fn pie(hole: Option<f32>, cfg: &ChartConfig) -> ChartEncoding {
    ChartEncoding::Pie {
        names_field: WORD_FIELD.to_string(),
        values_field: FREQUENCY_FIELD.to_string(),
        hole,
        font: font(cfg),
    }
}

fn font(cfg: &ChartConfig) -> FontSpec {
    FontSpec {
        family: cfg.font_family.clone(),
        size: cfg.font_size,
    }
}

/// Build the declarative chart for `kind`. An empty table yields a valid spec with no rows.
pub fn build_chart(kind: ChartKind, table: &RankedTopTable, cfg: &ChartConfig) -> ChartSpec {
    let encoding = match kind {
        ChartKind::Bar => cartesian(Mark::Bar, table, cfg),
        ChartKind::Line => cartesian(Mark::Line, table, cfg),
        ChartKind::Scatter => cartesian(Mark::Scatter, table, cfg),
        ChartKind::Area => cartesian(Mark::Area, table, cfg),
        ChartKind::Pie => pie(None, cfg),
        ChartKind::Donut => pie(Some(DONUT_HOLE), cfg),
        ChartKind::Radar => ChartEncoding::Polar {
            theta_field: WORD_FIELD.to_string(),
            r_field: FREQUENCY_FIELD.to_string(),
            line_close: true,
        },
    };
    ChartSpec {
        kind,
        title: kind.title(),
        data: table.entries.clone(),
        encoding,
    }
}

/// Parse a selector (`bar`, `圆环图`, ...) and build the chart. Unknown selectors
/// fail with `UnsupportedChartKind`; there is no fallback kind.
pub fn dispatch(selector: &str, table: &RankedTopTable, cfg: &ChartConfig) -> Result<ChartSpec> {
    let kind: ChartKind = selector.parse()?;
    Ok(build_chart(kind, table, cfg))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pagefreq_core::{Error, RankedEntry};

    fn table(freqs: &[(&str, u64)]) -> RankedTopTable {
        RankedTopTable {
            entries: freqs
                .iter()
                .enumerate()
                .map(|(i, (w, f))| RankedEntry {
                    word: w.to_string(),
                    frequency: *f,
                    rank: i + 1,
                })
                .collect(),
        }
    }

    #[test]
    fn tick_interval_is_at_least_one() {
        assert_eq!(y_tick_interval(0, 10), 1);
        assert_eq!(y_tick_interval(9, 10), 1);
        assert_eq!(y_tick_interval(25, 10), 2);
        assert_eq!(y_tick_interval(1234, 10), 123);
        assert_eq!(y_tick_values(25, 2).len(), 13);
        assert_eq!(y_tick_values(5, 1), vec![0, 1, 2, 3, 4, 5]);
        assert_eq!(y_tick_values(0, 1), vec![0]);
    }

    #[test]
    fn every_kind_uses_word_and_frequency_fields() {
        let t = table(&[("苹果", 50), ("香蕉", 30), ("蓝莓", 3)]);
        let cfg = ChartConfig::default();
        for kind in ChartKind::ALL {
            let spec = build_chart(kind, &t, &cfg);
            assert_eq!(spec.kind, kind);
            assert_eq!(spec.fields(), ("word", "frequency"));
            assert_eq!(spec.data, t.entries);
            match (&spec.encoding, kind) {
                (ChartEncoding::Cartesian { mark, axes, font, .. }, _) => {
                    let want = match kind {
                        ChartKind::Bar => Mark::Bar,
                        ChartKind::Line => Mark::Line,
                        ChartKind::Scatter => Mark::Scatter,
                        ChartKind::Area => Mark::Area,
                        other => panic!("{other} should not be cartesian"),
                    };
                    assert_eq!(*mark, want);
                    assert_eq!(axes.y_tick_interval, 5);
                    assert_eq!(axes.y_tick_values, vec![0, 5, 10, 15, 20, 25, 30, 35, 40, 45, 50]);
                    assert_eq!(axes.x_tick_angle, 45);
                    assert_eq!(font.family, "SimHei");
                    assert!(spec.supports_cartesian_axes());
                }
                (ChartEncoding::Pie { hole, .. }, ChartKind::Pie) => assert_eq!(*hole, None),
                (ChartEncoding::Pie { hole, .. }, ChartKind::Donut) => {
                    assert_eq!(*hole, Some(DONUT_HOLE))
                }
                (ChartEncoding::Polar { line_close, .. }, ChartKind::Radar) => {
                    assert!(*line_close);
                    assert!(!spec.supports_cartesian_axes());
                    assert!(spec.font().is_none());
                }
                (enc, kind) => panic!("unexpected encoding {enc:?} for {kind}"),
            }
        }
    }

    #[test]
    fn empty_table_still_produces_a_spec() {
        let cfg = ChartConfig::default();
        for kind in ChartKind::ALL {
            let spec = build_chart(kind, &RankedTopTable::default(), &cfg);
            assert!(spec.data.is_empty());
            if let Some(axes) = spec.axes() {
                assert_eq!(axes.y_tick_interval, 1);
                assert_eq!(axes.y_tick_values, vec![0]);
            }
        }
    }

    #[test]
    fn dispatch_rejects_unknown_selectors() {
        let t = table(&[("苹果", 5)]);
        let err = dispatch("histogram", &t, &ChartConfig::default()).unwrap_err();
        assert!(matches!(err, Error::UnsupportedChartKind(ref s) if s == "histogram"));

        let spec = dispatch("圆环图", &t, &ChartConfig::default()).unwrap();
        assert_eq!(spec.kind, ChartKind::Donut);
    }
}
