// depng <input> <bpp> <bpl> [output]
//
// Reverses the scanline filters of a dump of inflated IDAT data. The height is
// the file length divided by `bpl`; the output defaults to the input file.
use log::{error, info};
use depng::filter::{Defilter, Error, Result, Strategy};

fn parse_arg(args: &[String], idx: usize, name: &str) -> Result<usize> {
    let raw = args.get(idx).ok_or_else(|| Error::config(format!("missing <{}>", name)))?;
    raw.parse().map_err(|e| Error::config(format!("<{}> {:?}: {}", name, raw, e)))
}

fn run(args: &[String]) -> Result<()> {
    let input = args.get(1).ok_or_else(|| Error::config("usage: depng <input> <bpp> <bpl> [output]"))?;
    let bpp = parse_arg(args, 2, "bpp")?;
    let bpl = parse_arg(args, 3, "bpl")?;
    let output = args.get(4).unwrap_or(input);

    let strategy = match std::env::var("DEPNG_STRATEGY") {
        Ok(s) => s.parse()?,
        Err(_) => Strategy::default(),
    };

    let mut data = std::fs::read(input)?;
    if bpl == 0 || data.len() % bpl != 0 {
        return Err(Error::bad_geometry(format!("{} bytes is not a whole number of {}-byte rows", data.len(), bpl)));
    }
    let height = data.len() / bpl;

    let filters = Defilter::with_strategy(strategy).run(&mut data, height, bpp, bpl)?;
    std::fs::write(output, &data)?;

    info!("{}: {} rows, filters {:?} -> {}", input, height, filters, output);
    Ok(())
}

fn main() {
    dotenv::dotenv().ok();
    env_logger::init();

    let args: Vec<String> = std::env::args().collect();
    if let Err(e) = run(&args) {
        error!("{}", e);
        std::process::exit(1);
    }
}
