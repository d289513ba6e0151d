use matrix_steps::{NumericValue, OperationEngine, OperationResult, ResultValue, Step};

type ExampleError = Box<dyn std::error::Error>;

fn print_result(title: &str, result: &OperationResult) {
    println!("=== {title}");
    match result {
        OperationResult::Success(computation) => {
            for step in &computation.steps {
                match step {
                    Step::Text(line) => println!("{line}"),
                    Step::Matrix(rows) => {
                        for row in rows {
                            println!("  [ {} ]", row.join("  "));
                        }
                    }
                }
            }
            match &computation.result {
                ResultValue::Matrix(rows) => {
                    for row in rows {
                        println!("  [ {} ]", row.join("  "));
                    }
                }
                ResultValue::Scalar(value) => println!("  {value}"),
            }
        }
        OperationResult::Failure(error) => println!("error: {error}"),
    }
    println!();
}

fn main() -> Result<(), ExampleError> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    log::info!("Starting matrix walkthrough...");
    let mut engine = OperationEngine::in_memory();

    let a = vec![vec![1.0, 2.0], vec![3.0, 4.0]];
    let b = vec![vec![5.0, 6.0], vec![7.0, 8.0]];

    print_result("A + B", &engine.add(a.clone(), b.clone()));
    print_result("A × B", &engine.multiply(a.clone(), b));
    let det = engine.determinant(a.clone());
    print_result("det(A)", &det);
    if let Some(value) = det.numeric().and_then(NumericValue::as_scalar) {
        log::info!("det(A) as f64: {}", value);
    }
    print_result("A⁻¹", &engine.inverse(a));
    print_result(
        "det of a 3x3",
        &engine.determinant(vec![
            vec![2.0, -3.0, 1.0],
            vec![2.0, 0.0, -1.0],
            vec![1.0, 4.0, 5.0],
        ]),
    );
    print_result("singular inverse", &engine.inverse(vec![vec![1.0, 2.0], vec![2.0, 4.0]]));

    log::info!("{} operations recorded in history", engine.history_list()?.len());
    Ok(())
}
