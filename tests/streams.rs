mod common;

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use common::{mock_compose, with_timeout, CallLog};
use taskcompose::compose::Item;
use taskcompose::errors::ComposeError;
use taskcompose::runner::{Native, Runner};
use taskcompose::stream::Transform;
use taskcompose::types::{DestOptions, SrcOptions};

fn uppercase() -> Transform {
    Transform::map("uppercase", |mut file| {
        let text = file.contents_lossy().unwrap_or_default().to_uppercase();
        file.set_contents(text);
        Ok(file)
    })
}

#[test]
fn src_builder_keeps_globs_options_and_pipes_in_order() {
    let (gc, _fs) = mock_compose();
    let options = SrcOptions {
        read: false,
        ..SrcOptions::default()
    };

    let src = gc
        .src(["src/**/*.js", "!src/vendor/**"], Some(options.clone()))
        .pipe(uppercase())
        .pipe(gc.dest("dist", None));

    assert_eq!(src.globs().patterns(), &["src/**/*.js", "!src/vendor/**"]);
    assert_eq!(src.options(), &options);
    assert_eq!(src.pipes().len(), 2);
    assert!(matches!(src.pipes()[0], Item::Stage(ref t) if t.label() == "uppercase"));
    assert!(matches!(src.pipes()[1], Item::Composable(_)));
}

#[test]
fn src_without_options_uses_the_defaults() {
    let (gc, _fs) = mock_compose();
    let src = gc.src("src/*.js", None);

    assert_eq!(src.options(), &SrcOptions::default());
    assert!(src.options().read);
    assert!(!src.options().allow_empty);
    assert!(src.pipes().is_empty());
}

#[tokio::test]
async fn func_over_src_drains_the_stream_into_dest() {
    let (mut gc, fs) = mock_compose();
    fs.add_file("./src/app.js", "let a = 1;");
    fs.add_file("./src/lib/util.js", "let b = 2;");
    fs.add_file("./src/vendor/dep.js", "vendored");
    fs.add_file("./src/readme.md", "docs");

    let build = gc.func(
        gc.src(["src/**/*.js", "!src/vendor/**"], None)
            .pipe(uppercase())
            .pipe(gc.dest("dist", None)),
    );
    gc.task("build", build);

    let runner = gc.compose().unwrap();
    with_timeout(runner.run("build")).await.unwrap();

    assert_eq!(fs.contents("./dist/app.js"), Some(b"LET A = 1;".to_vec()));
    assert_eq!(fs.contents("./dist/lib/util.js"), Some(b"LET B = 2;".to_vec()));
    assert!(fs.contents("./dist/vendor/dep.js").is_none());
    assert!(fs.contents("./dist/readme.md").is_none());
}

#[tokio::test]
async fn resolved_src_is_a_stream_with_files_in_glob_order() {
    let (gc, fs) = mock_compose();
    fs.add_file("./b/2.txt", "2");
    fs.add_file("./a/1.txt", "1");

    let runner = gc.runner();
    let src = gc.src(["b/*.txt", "a/*.txt"], None);
    let Native::Stream(stream) = src.resolve(&runner).unwrap() else {
        panic!("src should resolve to a stream");
    };

    let files = stream.collect().unwrap();
    let paths: Vec<PathBuf> = files.iter().map(|f| f.path.clone()).collect();
    assert_eq!(paths, vec![PathBuf::from("./b/2.txt"), PathBuf::from("./a/1.txt")]);
    assert_eq!(files[0].relative(), PathBuf::from("2.txt"));
}

#[tokio::test]
async fn piping_a_second_source_merges_its_files() {
    let (gc, fs) = mock_compose();
    fs.add_file("./src/a.js", "a");
    fs.add_file("./extra/b.js", "b");

    let runner = gc.runner();
    let src = gc
        .src("src/*.js", None)
        .pipe(gc.src("extra/*.js", None))
        .pipe(gc.dest("out", None));
    let Native::Stream(stream) = src.resolve(&runner).unwrap() else {
        panic!("src should resolve to a stream");
    };

    assert_eq!(stream.drain().unwrap(), 2);
    assert_eq!(fs.contents("./out/a.js"), Some(b"a".to_vec()));
    assert_eq!(fs.contents("./out/b.js"), Some(b"b".to_vec()));
}

#[tokio::test]
async fn missing_singular_glob_is_an_error_unless_allowed() {
    let (gc, fs) = mock_compose();
    fs.add_file("./present.txt", "here");
    let runner = gc.runner();

    let strict = gc.func(gc.src(["present.txt", "missing.txt"], None));
    let Native::Work(work) = strict.resolve(&runner).unwrap() else {
        panic!("func should resolve to work");
    };
    let err = with_timeout(work.call()).await.unwrap_err();
    assert!(matches!(err, ComposeError::SingularGlob(ref p) if p.ends_with("missing.txt")));

    let lenient = gc.func(gc.src(
        ["present.txt", "missing.txt"],
        Some(SrcOptions {
            allow_empty: true,
            ..SrcOptions::default()
        }),
    ));
    let Native::Work(work) = lenient.resolve(&runner).unwrap() else {
        panic!("func should resolve to work");
    };
    with_timeout(work.call()).await.unwrap();
}

#[tokio::test]
async fn read_false_streams_paths_without_contents() {
    let (gc, fs) = mock_compose();
    fs.add_file("./src/a.txt", "a");

    let seen = Arc::new(Mutex::new(Vec::new()));
    let seen_in_stage = Arc::clone(&seen);
    let src = gc
        .src(
            "src/*.txt",
            Some(SrcOptions {
                read: false,
                ..SrcOptions::default()
            }),
        )
        .pipe(Transform::inspect("record", move |file| {
            seen_in_stage
                .lock()
                .unwrap()
                .push((file.path.clone(), file.contents.is_some()));
        }))
        .pipe(gc.dest("out", None));

    let Native::Stream(stream) = src.resolve(&gc.runner()).unwrap() else {
        panic!("src should resolve to a stream");
    };
    stream.drain().unwrap();

    assert_eq!(*seen.lock().unwrap(), vec![(PathBuf::from("./src/a.txt"), false)]);
    assert!(fs.contents("./out/a.txt").is_none());
}

#[tokio::test]
async fn dest_respects_overwrite_option() {
    let (gc, fs) = mock_compose();
    fs.add_file("./src/a.txt", "new");
    fs.add_file("./out/a.txt", "old");

    let src = gc.src("src/*.txt", None).pipe(gc.dest(
        "out",
        Some(DestOptions {
            overwrite: false,
            ..DestOptions::default()
        }),
    ));
    let Native::Stream(stream) = src.resolve(&gc.runner()).unwrap() else {
        panic!("src should resolve to a stream");
    };
    stream.drain().unwrap();

    assert_eq!(fs.contents("./out/a.txt"), Some(b"old".to_vec()));
}

#[tokio::test]
async fn pump_reports_success_through_its_callback() {
    let (mut gc, fs) = mock_compose();
    fs.add_file("./src/a.txt", "a");

    let outcome: Arc<Mutex<Vec<Option<String>>>> = Arc::new(Mutex::new(Vec::new()));
    let recorded = Arc::clone(&outcome);
    let pump = gc.pump(
        [
            Item::from(gc.src("src/*.txt", None)),
            Item::from(uppercase()),
            Item::from(gc.dest("out", None)),
        ],
        move |err| recorded.lock().unwrap().push(err.map(ToString::to_string)),
    );
    gc.task("pump", pump);

    let runner = gc.compose().unwrap();
    assert_eq!(runner.task("pump").unwrap().display_name(), "<pump>");
    with_timeout(runner.run("pump")).await.unwrap();

    assert_eq!(*outcome.lock().unwrap(), vec![None]);
    assert_eq!(fs.contents("./out/a.txt"), Some(b"A".to_vec()));
}

#[tokio::test]
async fn pump_stage_failure_goes_to_the_callback_only() {
    let (mut gc, fs) = mock_compose();
    fs.add_file("./src/a.txt", "a");
    fs.add_file("./src/b.txt", "b");

    let failing = Transform::new("explode", |file| {
        if file.path.ends_with("a.txt") {
            Err(anyhow::anyhow!("cannot process a.txt").into())
        } else {
            Ok(Some(file))
        }
    });

    let outcome: Arc<Mutex<Vec<Option<String>>>> = Arc::new(Mutex::new(Vec::new()));
    let recorded = Arc::clone(&outcome);
    let pump = gc.pump(
        [
            Item::from(gc.src("src/*.txt", None)),
            Item::from(failing),
            Item::from(gc.dest("out", None)),
        ],
        move |err| recorded.lock().unwrap().push(err.map(ToString::to_string)),
    );
    gc.task("pump", pump);

    let runner = gc.compose().unwrap();
    with_timeout(runner.run("pump")).await.unwrap();

    let outcome = outcome.lock().unwrap();
    assert_eq!(outcome.len(), 1);
    assert!(outcome[0].as_deref().unwrap_or_default().contains("cannot process a.txt"));
    assert!(fs.contents("./out/b.txt").is_none());
}

#[tokio::test]
async fn pump_needs_at_least_two_stages() {
    let (mut gc, _fs) = mock_compose();
    let pump = gc.pump([gc.src("src/*.txt", None)], |_| {});
    gc.task("pump", pump);

    let err = gc.compose().unwrap_err();
    assert!(err.to_string().contains("pump requires two streams per minimum"));
}

#[tokio::test]
async fn task_functions_cannot_be_piped() {
    let (gc, _fs) = mock_compose();
    let src = gc.src("src/*.txt", None).pipe(CallLog::new().task("oops"));

    let err = src.resolve(&gc.runner()).unwrap_err();
    assert!(matches!(err, ComposeError::NotPipeable(_)));
}

#[tokio::test]
async fn bare_streams_cannot_be_used_as_tasks() {
    let (gc, _fs) = mock_compose();
    let default = gc.series([gc.src("src/*.txt", None)]);

    let err = default.resolve(&gc.runner()).unwrap_err();
    assert!(matches!(err, ComposeError::NotRunnable(ref kind) if kind == "file stream"));
}
