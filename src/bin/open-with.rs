//! Prints every installed program able to open the given file extensions.

use std::process::ExitCode;

fn main() -> ExitCode {
    env_logger::init();

    let extensions: Vec<String> = std::env::args().skip(1).collect();
    if extensions.is_empty() {
        eprintln!("Usage: open-with EXTENSION [EXTENSION...]");
        return ExitCode::FAILURE;
    }
    let extensions: Vec<&str> = extensions.iter().map(String::as_str).collect();

    match open_with::find_programs(&extensions) {
        Ok(programs) if programs.is_empty() => {
            println!("No matching programs found");
            ExitCode::SUCCESS
        }
        Ok(programs) => {
            for program in &programs {
                println!("{}", program.name);
                if !program.comment.is_empty() {
                    println!("    {}", program.comment);
                }
                println!("    command: {}", program.exec.join(" "));
                if let Some(icon) = &program.icon {
                    println!("    icon: {}", icon.display());
                }
            }
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("Failed to scan for programs: {err}");
            ExitCode::FAILURE
        }
    }
}
