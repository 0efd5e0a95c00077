use steadystudy_core::parse_time_expression;

pub fn run(message: &str) -> Result<(), Box<dyn std::error::Error>> {
    match parse_time_expression(message) {
        Some(expr) => println!("{}", serde_json::to_string_pretty(&expr)?),
        None => {
            eprintln!("no time expression found");
            std::process::exit(1);
        }
    }
    Ok(())
}
