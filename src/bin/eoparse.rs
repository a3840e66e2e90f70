use std::env::args;
use std::io::{self, Read};

use cmpiutil::{debug_util, parse_embedded_instance, SimpleBroker};

fn main() {
    debug_util::init();

    let args: Vec<String> = args().collect();
    let namespace = match args.get(1) {
        None => {
            println!("Usage: eoparse <namespace> [<embedded instance>|-]");
            return;
        }
        Some(namespace) => namespace,
    };

    let eo = match args.get(2).map(String::as_str) {
        None | Some("-") => {
            let mut input = String::new();
            if let Err(e) = io::stdin().read_to_string(&mut input) {
                println!("Couldn't read the embedded instance from stdin because of {:?}", e);
                return;
            }
            input
        }
        Some(eo) => eo.to_owned(),
    };

    match parse_embedded_instance(&eo, &SimpleBroker::new(), namespace) {
        Err(e) => println!("Couldn't parse embedded instance because of {}", e),
        Ok(None) => println!("Not an embedded instance this build can parse"),
        Ok(Some(inst)) => {
            println!("{}", inst.object_path());
            println!("{:#?}", inst);
        }
    }
}
