use std::process;

fn main() {
    if let Err(err) = ant::run() {
        // Editor integrations surface stdout on non-zero exit; errors go there.
        println!("{}", err);
        process::exit(1);
    }
}
