use genweights::prelude::*;

fn log_init() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn processor(config: Config) -> RunProcessor {
    RunProcessorBuilder::default()
        .aggregator(RunAggregator::new(config).unwrap())
        .nstreams(2)
        .keep_event_tables(true)
        .show_progress(false)
        .build()
        .unwrap()
}

fn config() -> Config {
    Config::builder()
        .gen_event("generator")
        .lhe_info("externalLHEProducer")
        .build()
}

fn run(header: &str) -> Run {
    let block = HeaderBlock::from_text("initrwgt", header);
    Run::new(1, Some(LheRunInfo::new(vec![block])))
}

fn lhe_event(w_gen: f64, w0: f64, weights: &[(&str, f64)]) -> Event {
    let weights = weights
        .iter()
        .map(|&(id, wgt)| WeightRecord::new(id, wgt))
        .collect();
    Event::with_lhe(w_gen, LheEvent::new(w0, weights))
}

const SCALE_HEADER: &str = r#"<weightgroup name="scale_variation" combine="envelope">
<weight id="1001"> muR=1 muF=1 </weight>
<weight id="1002"> muR=2 muF=2 </weight>
</weightgroup>"#;

#[test]
fn no_lhe_run() {
    log_init();
    let events = [Event::gen_only(1.), Event::gen_only(3.)];
    let out = processor(config())
        .process_run(&Run::new(1, None), &events)
        .unwrap();
    assert_eq!(out.counters.int("genEventCount"), Some(2));
    assert_eq!(out.counters.float("genEventSumw"), Some(4.));
    assert_eq!(out.counters.float("genEventSumw2"), Some(10.));
    assert!(out.counters.vfloat("LHEScaleSumw").unwrap().is_empty());
    assert!(out.counters.vfloat("LHEPdfSumw").unwrap().is_empty());
    assert!(out.weight_choice.is_empty());
    for tables in &out.event_tables {
        for table in [&tables.lhe_scale, &tables.lhe_pdf, &tables.lhe_named] {
            assert_eq!(table.nrows(), 1);
            assert!(table.columns().is_empty());
        }
    }
}

#[test]
fn scale_only_header() {
    log_init();
    let events = [lhe_event(1., 1., &[("1001", 1.5), ("1002", 0.5)])];
    let out = processor(config())
        .process_run(&run(SCALE_HEADER), &events)
        .unwrap();
    assert_eq!(out.weight_choice.scale_weight_ids, ["1001", "1002"]);
    assert!(out.weight_choice.pdf_weight_ids.is_empty());
    assert_eq!(
        out.event_tables[0].lhe_scale.values(""),
        Some([1.5f32, 0.5].as_slice())
    );
    assert_eq!(
        out.counters.vfloat("LHEScaleSumw"),
        Some([1.5, 0.5].as_slice())
    );
}

#[test]
fn pdf_priority_selection() {
    log_init();
    let mut header = String::from("<weightgroup name=\"PDF_variation\" combine=\"hessian\">\n");
    for n in 0..101 {
        header += &format!(
            "<weight id=\"{}\"> PDF set = {} </weight>\n",
            2001 + n,
            306000 + n
        );
    }
    header += "</weightgroup>";
    let config = Config::builder()
        .gen_event("generator")
        .lhe_info("externalLHEProducer")
        .preferred_pdfs(vec![260000, 306000])
        .build();
    let out = processor(config).process_run(&run(&header), &[]).unwrap();
    let ids = &out.weight_choice.pdf_weight_ids;
    assert_eq!(ids.len(), 101);
    assert_eq!(ids[0], "2001");
    assert_eq!(ids[100], "2101");
    assert!(out.weight_choice.pdf_weights_doc.contains("306000 - 306100"));
}

#[test]
fn named_weights() {
    log_init();
    let config = Config::builder()
        .gen_event("generator")
        .lhe_info("externalLHEProducer")
        .named_weight_ids(vec!["PSw0".to_owned(), "PSw1".to_owned()])
        .named_weight_labels(vec!["isrUp".to_owned(), "fsrUp".to_owned()])
        .build();
    let events = [lhe_event(
        1.,
        1.,
        &[("PSw0", 1.2), ("PSw1", 0.8), ("extra", 9.)],
    )];
    let out = processor(config)
        .process_run(&run(SCALE_HEADER), &events)
        .unwrap();
    let named = &out.event_tables[0].lhe_named;
    let columns: Vec<_> = named.columns().iter().map(|c| c.name.as_str()).collect();
    assert_eq!(columns, ["originalXWGTUP", "isrUp", "fsrUp"]);
    assert_eq!(named.values("originalXWGTUP"), Some([1f32].as_slice()));
    assert_eq!(named.values("isrUp"), Some([1.2f32].as_slice()));
    assert_eq!(named.values("fsrUp"), Some([0.8f32].as_slice()));
    let isr = out.counters.float("LHESumw_isrUp").unwrap();
    let fsr = out.counters.float("LHESumw_fsrUp").unwrap();
    assert!((isr - 1.2).abs() < 1e-9, "{isr}");
    assert!((fsr - 0.8).abs() < 1e-9, "{fsr}");
}

#[test]
fn missing_in_event() {
    log_init();
    let events = [lhe_event(1., 1., &[("1001", 1.4)])];
    let out = processor(config())
        .process_run(&run(SCALE_HEADER), &events)
        .unwrap();
    assert_eq!(
        out.event_tables[0].lhe_scale.values(""),
        Some([1.4f32, 1.].as_slice())
    );
}

#[test]
fn implicit_group_close() {
    log_init();
    let header = r#"<weightgroup name="scale_variation">
<weight id="1">muR=1 muF=1</weight>
<weightgroup name="PDF_variation">
<weight id="2">PDF set = 260000</weight>
</weightgroup>"#;
    let config = Config::builder()
        .gen_event("generator")
        .lhe_info("externalLHEProducer")
        .preferred_pdfs(vec![260000])
        .build();
    let out = processor(config).process_run(&run(header), &[]).unwrap();
    assert_eq!(out.weight_choice.scale_weight_ids, ["1"]);
    assert_eq!(out.weight_choice.pdf_weight_ids, ["2"]);
    assert!(out.weight_choice.pdf_weights_doc.contains("260000"));
}
