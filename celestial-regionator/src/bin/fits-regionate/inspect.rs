use crate::cli::{Cli, InspectArgs};
use anyhow::Context;
use celestial_fits::header::CARD_SIZE;
use celestial_fits::{FitsFile, Header, HeaderOptions, TableSource};

pub fn run(args: &InspectArgs, cli: &Cli) -> anyhow::Result<()> {
    let mut fits =
        FitsFile::open(&args.input).with_context(|| format!("opening {}", args.input.display()))?;

    println!("=== {} ===", args.input.display());
    let hdus = fits.hdus().to_vec();
    for (index, hdu) in hdus.iter().enumerate() {
        match hdu.data_offset {
            Some(data) => println!(
                "HDU {index}: header at byte {}, data at byte {data}",
                hdu.header_offset
            ),
            None => println!("HDU {index}: header at byte {}, no data", hdu.header_offset),
        }
    }

    println!();
    print_cards(&fits.primary_header()?)?;

    for index in 1..hdus.len() {
        let header = fits.read_header(index, HeaderOptions::permissive())?;
        if header.extension_type() != Some("BINTABLE") {
            println!();
            println!(
                "HDU {index}: {} extension",
                header.extension_type().unwrap_or("unknown")
            );
            continue;
        }

        let table = fits.read_table(index, HeaderOptions::permissive())?;
        println!();
        println!("HDU {index}: binary table, {} rows", table.num_rows());
        println!("Columns: {}", table.column_names().join(", "));
        if cli.verbose {
            print_cards(&header)?;
        }
    }
    Ok(())
}

fn print_cards(header: &Header) -> anyhow::Result<()> {
    let cards = header.to_card_string(false)?;
    for card in cards.as_bytes().chunks(CARD_SIZE) {
        println!("{}", String::from_utf8_lossy(card).trim_end());
    }
    Ok(())
}
