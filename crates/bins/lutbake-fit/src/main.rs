use base::{cli, cli::CommonArgs};
use bxdf::BrdfKind;
use config::{Config, Error};
use ltc::{FloatFormat, LtcLut};
use std::{
    path::{Path, PathBuf},
    time::Instant,
};

mod config;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let (args, launch_time) = cli::parse_args::<CliArgs>("lutbake-fit");

    cli::setup_logging(
        args.common.log_timestamp.then_some(launch_time),
        args.common.log_level,
        &[],
    );

    let config = args.resolve_config()?;
    bake(&config)?;

    Ok(())
}

/// Fits the table, packs it and writes both textures.
fn bake(config: &Config) -> Result<(), Error> {
    let n = config.fit.lut_size;
    log::info!(
        "Fitting {} with a {}x{} table, {}x{} samples per estimate",
        config.brdf,
        n,
        n,
        config.fit.sample_count,
        config.fit.sample_count
    );
    let brdf = config.brdf.new_boxed();
    let start = Instant::now();
    let table = ltc::fit_table(brdf.as_ref(), &config.fit)?;
    log::info!("Table fitted in {:.2} s", start.elapsed().as_secs_f32());

    let start = Instant::now();
    let sphere = ltc::gen_sphere_table(n);
    log::info!("Sphere table generated in {:.2} s", start.elapsed().as_secs_f32());

    let lut = LtcLut::pack(&table, &sphere)?;
    let (ltc_1, ltc_2) = lut.to_bytes(config.format);
    std::fs::create_dir_all(&config.output_dir).map_err(|err| {
        Error::from_io_error(err, "Failed to create output directory", &config.output_dir)
    })?;
    write_blob(&config.output_dir.join("ltc_1.bin"), &ltc_1)?;
    write_blob(&config.output_dir.join("ltc_2.bin"), &ltc_2)?;
    Ok(())
}

fn write_blob(path: &Path, bytes: &[u8]) -> Result<(), Error> {
    std::fs::write(path, bytes)
        .map_err(|err| Error::from_io_error(err, "Failed to write", path))?;
    log::info!("Wrote {} ({} bytes)", path.display(), bytes.len());
    Ok(())
}

#[derive(clap::Parser, Debug, Clone)]
#[clap(
    author,
    version,
    about = "Fits linearly transformed cosines to a BRDF and exports the look-up tables."
)]
pub struct CliArgs {
    #[command(flatten)]
    pub common: CommonArgs,

    /// Path to a TOML configuration file. Flags override its values.
    #[clap(short, long, help = "Path to the configuration file")]
    pub config: Option<PathBuf>,

    #[clap(short, long, help = "BRDF model to fit")]
    pub brdf: Option<BrdfKind>,

    #[clap(short, long, help = "Number of table entries along each axis")]
    pub size: Option<usize>,

    #[clap(
        short = 'n',
        long,
        help = "Number of stratified samples per dimension of the estimators"
    )]
    pub samples: Option<u32>,

    #[clap(short, long, help = "Float format of the exported textures")]
    pub format: Option<FloatFormat>,

    #[clap(short, long, help = "Output directory")]
    pub output: Option<PathBuf>,
}

impl CliArgs {
    /// Loads the configuration file if any and applies the flags on top.
    fn resolve_config(&self) -> Result<Config, Error> {
        let config = match &self.config {
            Some(path) => Config::load(path)?,
            None => Config::default(),
        };
        Ok(self.apply(config))
    }

    fn apply(&self, mut config: Config) -> Config {
        if let Some(brdf) = self.brdf {
            config.brdf = brdf;
        }
        if let Some(size) = self.size {
            config.fit.lut_size = size;
        }
        if let Some(samples) = self.samples {
            config.fit.sample_count = samples;
        }
        if let Some(format) = self.format {
            config.format = format;
        }
        if let Some(output) = &self.output {
            config.output_dir = output.clone();
        }
        config
    }
}
