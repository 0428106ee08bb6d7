//! Plot pipeline tests
//!
//! Fan-out of single and multi-figure artists, plot folder allocation and
//! ordering between registered plotters.

use std::cell::RefCell;
use std::fs;
use std::path::Path;
use std::rc::Rc;

use tempfile::TempDir;
use trueno_runs::plot::{Artist, BytesFigure, Figure, Plot, Plotter, SaveOptions};
use trueno_runs::{Error, RunStore};

fn file_names(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

fn histogram(_: &u32, r: &Vec<u32>) -> anyhow::Result<Plot> {
    Ok(Plot::single(BytesFigure::new(format!("{r:?}"))))
}

fn panels(_: &u32, r: &Vec<u32>) -> anyhow::Result<Plot> {
    Ok(Plot::many(
        ["mean", "min", "max"]
            .into_iter()
            .map(|name| (name, BytesFigure::new(format!("{name}:{}", r.len())))),
    ))
}

fn counting(c: &u32) -> anyhow::Result<Vec<u32>> {
    Ok((0..*c).collect())
}

#[test]
fn test_single_figure_written_directly() {
    let root = TempDir::new().unwrap();
    let store = RunStore::builder(root.path(), "single", counting)
        .plotter(Plotter::new("histogram", histogram).format("svg"))
        .build();

    let run = store.create(3).unwrap();
    let folder = run.location().join("plots/plot");

    assert_eq!(file_names(&folder), vec!["histogram.svg"]);
    assert_eq!(fs::read_to_string(folder.join("histogram.svg")).unwrap(), "[0, 1, 2]");
}

#[test]
fn test_mapping_fans_out_into_artist_folder() {
    let root = TempDir::new().unwrap();
    let store = RunStore::builder(root.path(), "multi", counting)
        .plotter(Plotter::new("panels", panels).format("png"))
        .build();

    let run = store.create(5).unwrap();
    let folder = run.location().join("plots/plot");

    assert_eq!(file_names(&folder), vec!["panels"]);
    assert_eq!(
        file_names(&folder.join("panels")),
        vec!["max.png", "mean.png", "min.png"]
    );
    assert_eq!(fs::read_to_string(folder.join("panels/min.png")).unwrap(), "min:5");
}

#[test]
fn test_no_plotters_no_plots_folder() {
    let root = TempDir::new().unwrap();
    let store = RunStore::new(root.path(), "bare", counting);

    let run = store.create(2).unwrap();
    assert!(!run.location().join("plots").exists());
}

#[test]
fn test_replot_uses_fresh_folder() {
    let root = TempDir::new().unwrap();
    let store = RunStore::builder(root.path(), "replot", counting)
        .plotters([
            Plotter::new("histogram", histogram),
            Plotter::new("panels", panels),
        ])
        .build();

    let run = store.create(2).unwrap();
    let folder = run.plot().unwrap();

    assert_eq!(folder, run.location().join("plots/plot (1)"));
    assert_eq!(file_names(&folder), vec!["histogram.pdf", "panels"]);
    assert_eq!(file_names(&run.location().join("plots")), vec!["plot", "plot (1)"]);
}

#[test]
fn test_replot_from_lookup_ignores_creation_plots() {
    let root = TempDir::new().unwrap();
    let store = RunStore::builder(root.path(), "lookup", counting)
        .plotter(Plotter::new("histogram", histogram))
        .build();
    let location = store.create(4).unwrap().location().to_path_buf();
    fs::remove_dir_all(location.join("plots/plot")).unwrap();

    let folder = store.lookup(location.as_path()).unwrap().plot().unwrap();

    assert_eq!(folder, location.join("plots/plot"));
    assert!(folder.join("histogram.pdf").is_file());
}

#[test]
fn test_same_artist_name_last_plotter_wins() {
    let root = TempDir::new().unwrap();
    let store = RunStore::builder(root.path(), "clash", counting)
        .plotter(Plotter::new("figure", |_: &u32, _: &Vec<u32>| {
            Ok(Plot::single(BytesFigure::new("first")))
        }))
        .plotter(Plotter::new("figure", |_: &u32, _: &Vec<u32>| {
            Ok(Plot::single(BytesFigure::new("second")))
        }))
        .build();

    let run = store.create(1).unwrap();

    let written = fs::read_to_string(run.location().join("plots/plot/figure.pdf")).unwrap();
    assert_eq!(written, "second");
}

struct Recording {
    log: Rc<RefCell<Vec<String>>>,
}

impl Figure for Recording {
    fn save(&self, path: &Path, options: &SaveOptions) -> anyhow::Result<()> {
        let dpi = options.get("dpi").and_then(serde_json::Value::as_u64).unwrap_or(0);
        self.log
            .borrow_mut()
            .push(format!("{}@{dpi}", path.file_name().unwrap().to_string_lossy()));
        fs::write(path, b"")?;
        Ok(())
    }
}

#[test]
fn test_plotters_run_in_registration_order_with_options() {
    let root = TempDir::new().unwrap();
    let log = Rc::new(RefCell::new(Vec::new()));
    let (a, b) = (Rc::clone(&log), Rc::clone(&log));

    let store = RunStore::builder(root.path(), "order", counting)
        .plotter(
            Plotter::new("zeta", move |_: &u32, _: &Vec<u32>| {
                Ok(Plot::single(Recording { log: Rc::clone(&a) }))
            })
            .option("dpi", 300),
        )
        .plotter(Plotter::from_artist(Artist::new(
            "alpha",
            move |_: &u32, _: &Vec<u32>| Ok(Plot::single(Recording { log: Rc::clone(&b) })),
        )))
        .build();

    store.create(1).unwrap();

    assert_eq!(*log.borrow(), vec!["zeta.pdf@300", "alpha.pdf@0"]);
}

#[test]
fn test_artist_failure_surfaces_after_result_is_saved() {
    let root = TempDir::new().unwrap();
    let store = RunStore::builder(root.path(), "broken", counting)
        .plotter(Plotter::new("bad", |_: &u32, _: &Vec<u32>| anyhow::bail!("empty series")))
        .build();

    let err = store.create(0).unwrap_err();

    assert!(matches!(err, Error::Plot { ref artist, .. } if artist == "bad"));
    assert_eq!(store.iter().count(), 1);
}
