use hwsnap_core::report;

pub fn run(json: bool) {
    let items = match report::read_all() {
        Ok(items) => items,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };

    if json {
        super::print_json(&super::snapshot_json(&items));
    } else {
        println!("{}", super::render_text(&items));
    }
}
