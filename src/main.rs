use rheed_live_analysis::local;

fn main() {
    let args: Vec<String> = std::env::args().collect();
    if args.len() > 1 {
        match args[1].as_str() {
            "demo" => local::demo::run().unwrap(),
            "replay" => {
                if args.len() > 2 {
                    local::replay::run(&args[2]).unwrap()
                } else {
                    println!("Please pass the series CSV to replay, e.g. 'replay demo_cyan.csv'")
                }
            }
            _ => println!("Invalid argument, please use 'demo' or 'replay <file>'"),
        }
    } else {
        println!("Please specify 'demo' or 'replay <file>' as argument");
    }
}
