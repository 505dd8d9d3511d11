use hwsnap_core::{FOOTER, Hwmon, Report};

pub fn run(json: bool) {
    let hwmon = match Hwmon::read() {
        Ok(hwmon) => hwmon,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };

    if json {
        super::print_json(&hwmon.to_json());
    } else {
        println!("{hwmon}");
        println!();
        println!("{FOOTER}");
    }
}
