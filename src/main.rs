use std::fs;
use std::time::Instant;

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use image::{ImageBuffer, Rgb, RgbImage};

mod raytracing;
use raytracing::camera::{Camera, DEFAULT_DIVISIONS};
use raytracing::math::Vec3;
use raytracing::parser::{SceneDescription, SceneParser};
use raytracing::sampler::{render, ImageSink, Sampling};
use raytracing::scenes;
use raytracing::texture::{ImageTexture, TextureSampler};
use raytracing::tracer::RenderContext;

#[derive(Debug, Parser)]
#[command(version, about, long_about = None)]
struct Args {
    /// the input path to the scene file, the built-in room is rendered when missing
    scene: Option<String>,
    /// the path where is saved the rendered image
    #[arg(short, long, default_value = "output.bmp")]
    output: String,
    /// the number of pixels per side of the square image
    #[arg(short, long, value_parser = clap::value_parser!(u32).range(1..))]
    divisions: Option<u32>,
    /// shoot a single ray per pixel instead of four
    #[arg(long)]
    single_sample: bool,
    /// blend distant objects into white
    #[arg(long)]
    fog: bool,
    /// image mapped on the textured sphere
    #[arg(short, long)]
    texture: Option<String>,
}

impl From<Vec3> for Rgb<u8> {
    fn from(value: Vec3) -> Self {
        let channel = |v: f64| (v.clamp(0.0, 1.0) * 255.0) as u8;
        Rgb([channel(value.x), channel(value.y), channel(value.z)])
    }
}

impl ImageSink for RgbImage {
    fn put_pixel(&mut self, x: u32, y: u32, color: Vec3) {
        ImageBuffer::put_pixel(self, x, y, color.into());
    }
}

fn load_scene(path: Option<&str>) -> Result<SceneDescription> {
    let Some(path) = path else {
        log::info!("no scene file given, rendering the built-in room");
        return Ok(SceneDescription {
            divisions: DEFAULT_DIVISIONS,
            fog: false,
            texture: Some(scenes::CLASSROOM_TEXTURE.to_string()),
            scene: scenes::classroom()?,
        });
    };

    let content = fs::read_to_string(path).with_context(|| format!("cannot read {}", path))?;
    SceneParser::new(&content).parse_scene().map_err(|err| {
        err.print_error_location(&content);
        anyhow!("failed to parse {}: {}", path, err)
    })
}

fn main() -> Result<()> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    let args = Args::parse();
    let description = load_scene(args.scene.as_deref())?;

    let divisions = args.divisions.unwrap_or(description.divisions);
    let fog = args.fog || description.fog;
    let texture = match args.texture.or(description.texture) {
        Some(path) => match ImageTexture::open(&path) {
            Ok(texture) => Some(texture),
            Err(err) => {
                log::warn!("{}, the textured sphere keeps its own color", err);
                None
            }
        },
        None => None,
    };
    let sampling = if args.single_sample {
        Sampling::Single
    } else {
        Sampling::Quad
    };

    let scene = description.scene;
    let ctx = RenderContext {
        texture: texture.as_ref().map(|t| t as &dyn TextureSampler),
        fog,
        ..RenderContext::new(&scene)
    };
    let camera = Camera::with_divisions(divisions);
    log::info!(
        "rendering {} objects at {}x{} ({:?} sampling, fog {})",
        scene.objects.len(),
        divisions,
        divisions,
        sampling,
        fog
    );

    let start = Instant::now();
    let mut buffer = RgbImage::new(divisions, divisions);
    render(&ctx, &camera, sampling, &mut buffer);
    log::info!("Rendered {} in {:?}", args.output, start.elapsed());

    buffer
        .save(&args.output)
        .with_context(|| format!("cannot save {}", args.output))?;
    Ok(())
}
