use std::collections::HashMap;
use std::error::Error;
use std::fs::File;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

use chrono::Local;
use clap::{Parser, Subcommand};
use csv::{ReaderBuilder, StringRecord, Trim, WriterBuilder};
use env_logger::{Builder, Env};

use coordinate_transformer::{PointTransformer, ProjectionOptions};
use proj_adapter::{Point, Projection};

#[derive(Parser, Debug)]
#[command(
    name = "projcall",
    about = "Forward, inverse and batch coordinate transforms through PROJ",
    author = "MIERUNE Inc.",
    version = "0.0.1"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Extra directory searched for proj.db and grid files
    #[arg(long, global = true, value_name = "DIR")]
    proj_data_dir: Option<PathBuf>,

    /// Allow PROJ to download missing grid files
    #[arg(long, global = true)]
    network: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Project longitude/latitude in degrees to projected x/y
    Fwd {
        #[arg(short, long, value_name = "DEF")]
        proj: String,

        /// CSV with x,y[,z] columns (stdin when omitted)
        #[arg(short, long, value_name = "FILE")]
        input: Option<PathBuf>,
    },
    /// Project x/y back to longitude/latitude in degrees
    Inv {
        #[arg(short, long, value_name = "DEF")]
        proj: String,

        /// CSV with x,y[,z] columns (stdin when omitted)
        #[arg(short, long, value_name = "FILE")]
        input: Option<PathBuf>,
    },
    /// Transform all points from one definition to another in one batch
    Transform {
        #[arg(long, value_name = "DEF")]
        from: String,

        #[arg(long, value_name = "DEF")]
        to: String,

        /// CSV with x,y[,z] columns (stdin when omitted)
        #[arg(short, long, value_name = "FILE")]
        input: Option<PathBuf>,
    },
}

#[derive(Debug, Default, PartialEq)]
struct Columns {
    x: Vec<f64>,
    y: Vec<f64>,
    z: Option<Vec<f64>>,
}

impl Columns {
    fn len(&self) -> usize {
        self.x.len()
    }
}

fn column_mapping(
    headers: &StringRecord,
) -> Result<HashMap<&'static str, usize>, Box<dyn Error>> {
    let mut mapping = HashMap::new();

    for (index, header) in headers.iter().enumerate() {
        let normalized_header = header.to_lowercase().replace(['_', '-'], "");
        for name in ["x", "y", "z"] {
            if normalized_header == name {
                mapping.insert(name, index);
                break;
            }
        }
    }

    for name in ["x", "y"] {
        if !mapping.contains_key(name) {
            return Err(format!("Required column '{}' is missing in CSV headers.", name).into());
        }
    }

    Ok(mapping)
}

fn parse_field(
    record: &StringRecord,
    index: usize,
    name: &str,
    row: usize,
) -> Result<f64, Box<dyn Error>> {
    let value = record.get(index).unwrap_or("");
    value.parse::<f64>().map_err(|e| {
        format!("row {}: invalid {} value {:?}: {}", row, name, value, e).into()
    })
}

fn read_columns<R: Read>(reader: R) -> Result<Columns, Box<dyn Error>> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .trim(Trim::All)
        .from_reader(reader);
    let mapping = column_mapping(rdr.headers()?)?;
    let (x_index, y_index) = (mapping["x"], mapping["y"]);
    let z_index = mapping.get("z").copied();

    let mut columns = Columns {
        z: z_index.map(|_| Vec::new()),
        ..Default::default()
    };

    for (i, record) in rdr.records().enumerate() {
        let record = record?;
        let row = i + 1;
        columns.x.push(parse_field(&record, x_index, "x", row)?);
        columns.y.push(parse_field(&record, y_index, "y", row)?);
        if let (Some(index), Some(z)) = (z_index, columns.z.as_mut()) {
            z.push(parse_field(&record, index, "z", row)?);
        }
    }

    Ok(columns)
}

// Rows flagged in `failed` are written with empty coordinate fields.
fn write_columns<W: Write>(
    writer: W,
    columns: &Columns,
    failed: &[bool],
) -> Result<(), Box<dyn Error>> {
    let mut wtr = WriterBuilder::new().from_writer(writer);

    match &columns.z {
        Some(_) => wtr.write_record(["x", "y", "z"])?,
        None => wtr.write_record(["x", "y"])?,
    }

    for i in 0..columns.len() {
        let failed = failed.get(i).copied().unwrap_or(false);
        let mut record = Vec::with_capacity(3);
        if failed {
            record.push(String::new());
            record.push(String::new());
        } else {
            record.push(columns.x[i].to_string());
            record.push(columns.y[i].to_string());
        }
        if let Some(z) = &columns.z {
            record.push(z[i].to_string());
        }
        wtr.write_record(&record)?;
    }

    wtr.flush()?;
    Ok(())
}

fn open_input(path: Option<&Path>) -> io::Result<Box<dyn Read>> {
    match path {
        Some(path) => Ok(Box::new(File::open(path)?)),
        None => Ok(Box::new(io::stdin().lock())),
    }
}

type PointCall = fn(&Projection, &mut Point) -> Result<(), proj_adapter::ProjError>;

// Runs `call` on every row; a failing row is reported and left out of the
// output instead of aborting the run.
fn project_rows(projection: &Projection, columns: &mut Columns, call: PointCall) -> Vec<bool> {
    let mut failed = vec![false; columns.len()];
    for i in 0..columns.len() {
        let mut point = Point::new(columns.x[i], columns.y[i]);
        match call(projection, &mut point) {
            Ok(()) => {
                columns.x[i] = point.x;
                columns.y[i] = point.y;
            }
            Err(e) => {
                log::warn!("row {}: {}", i + 1, e.message());
                failed[i] = true;
            }
        }
    }
    failed
}

fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    let options = ProjectionOptions {
        proj_data_dir: cli.proj_data_dir,
        enable_network: cli.network,
    };

    match cli.command {
        Command::Fwd { proj, input } => {
            log::info!("forward projection: {}", proj);
            let projection = Projection::with_options(&proj, &options)?;
            let mut columns = read_columns(open_input(input.as_deref())?)?;
            log::info!("read {} points", columns.len());
            let failed = project_rows(&projection, &mut columns, proj_adapter::fwd);
            write_columns(io::stdout().lock(), &columns, &failed)?;
        }
        Command::Inv { proj, input } => {
            log::info!("inverse projection: {}", proj);
            let projection = Projection::with_options(&proj, &options)?;
            let mut columns = read_columns(open_input(input.as_deref())?)?;
            log::info!("read {} points", columns.len());
            let failed = project_rows(&projection, &mut columns, proj_adapter::inv);
            write_columns(io::stdout().lock(), &columns, &failed)?;
        }
        Command::Transform { from, to, input } => {
            log::info!("transform: {} -> {}", from, to);
            let transformer = PointTransformer::new(&from, &to, &options)?;
            let mut columns = read_columns(open_input(input.as_deref())?)?;
            log::info!("read {} points", columns.len());
            transformer.transform_in_place(
                &mut columns.x,
                &mut columns.y,
                columns.z.as_deref_mut(),
            )?;
            write_columns(io::stdout().lock(), &columns, &[])?;
        }
    }

    Ok(())
}

fn main() {
    Builder::from_env(Env::default().default_filter_or("info"))
        .format(|buf, record| {
            writeln!(
                buf,
                "{} [{}] - {}",
                Local::now().format("%Y-%m-%d %H:%M:%S"),
                record.level(),
                record.args()
            )
        })
        .init();

    let args = Cli::parse();

    let start = std::time::Instant::now();
    if let Err(e) = run(args) {
        log::error!("{}", e);
        std::process::exit(1);
    }
    log::info!("Elapsed: {:?}", start.elapsed());
}
