use std::rc::Rc;

use clap::Parser;

use crate::model::{AxisKind, ImageDescriptor};
use crate::runtime::{AppContext, ImageConfig, load_descriptor};
use crate::widgets::{ChannelMode, Component, DimensionSlider};

use super::types::{Cli, Commands, DimensionSummary, SessionSummary};

pub fn run_cli() -> Result<(), String> {
    let cli = Cli::parse();

    match cli.command {
        Commands::View { session, settings } => crate::ui::run(session, settings)?,
        Commands::Inspect { session } => {
            let descriptor = load_descriptor(&session).map_err(|error| error.to_string())?;
            let summary = summarize(&descriptor).map_err(|error| error.to_string())?;
            println!(
                "{}",
                serde_json::to_string_pretty(&summary).map_err(|error| error.to_string())?
            );
        }
    }

    Ok(())
}

/// Binds the dimension sliders to `descriptor` headlessly and reports their state.
pub fn summarize(descriptor: &ImageDescriptor) -> crate::runtime::Result<SessionSummary> {
    let context = AppContext::new();
    let config = context.add_config(descriptor)?;
    let info = config.image_info();

    let dimensions = info
        .dimensions
        .iter()
        .map(|(axis, dimension)| DimensionSummary {
            axis,
            value: dimension.value.get(),
            extent: dimension.extent,
            slider: slider_selector(&context, &config, axis),
        })
        .collect();

    Ok(SessionSummary {
        name: info.name.clone(),
        pixel_type: info.pixel_type,
        ready: info.ready.get(),
        dimensions,
        projection: info.projection.get(),
        projection_range: info.projection_opts.get(),
        channel_mode: ChannelMode::initial(info).label().to_string(),
        channels: info.channel_descriptors(),
    })
}

fn slider_selector(context: &AppContext, config: &Rc<ImageConfig>, axis: AxisKind) -> Option<String> {
    if !matches!(axis, AxisKind::Z | AxisKind::Time) {
        return None;
    }
    let slider = DimensionSlider::new(context, axis);
    slider.initialize(Rc::clone(config));
    slider.mount();
    let selector = slider.has_control().then(|| slider.selector()).flatten();
    slider.unmount();
    slider.dispose();
    selector
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::summarize;
    use crate::model::{AxisKind, DimensionDescriptor, ImageDescriptor, PixelType, Projection};

    #[test]
    fn summary_lists_sliders_for_navigable_dimensions() {
        let mut dimensions = BTreeMap::new();
        dimensions.insert(AxisKind::Z, DimensionDescriptor { value: 1, extent: 4 });
        dimensions.insert(AxisKind::Time, DimensionDescriptor { value: 0, extent: 1 });
        dimensions.insert(AxisKind::X, DimensionDescriptor { value: 0, extent: 512 });
        let descriptor = ImageDescriptor {
            name: None,
            pixel_type: PixelType::U8,
            ready: true,
            dimensions,
            projection: Projection::Normal,
            projection_opts: None,
            channels: Vec::new(),
            imported_channels: None,
        };

        let summary = summarize(&descriptor).expect("summary");
        let sliders = summary
            .dimensions
            .iter()
            .map(|dimension| (dimension.axis, dimension.slider.clone()))
            .collect::<Vec<_>>();

        assert_eq!(
            sliders,
            vec![
                (AxisKind::X, None),
                (AxisKind::Z, Some("#1 [dim='z'] [name='dim']".to_string())),
                (AxisKind::Time, None),
            ]
        );
        assert_eq!(summary.channel_mode, "Min/Max");
        assert_eq!(summary.projection_range.end, 3);
    }
}
