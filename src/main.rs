// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use std::error::Error;
use std::path::PathBuf;

use clap::Parser;
use wardnav::{
    load_from_osm_file, load_or_download, EndpointStatus, Graph, OverpassClient, Planner,
    RouteSummary, ServiceArea,
};

#[derive(Parser)]
#[command(about = "Shortest paths over a ward's street network, with user road bans")]
struct Cli {
    /// Latitude of the start point
    start_lat: f64,

    /// Longitude of the start point
    start_lon: f64,

    /// Latitude of the end point
    end_lat: f64,

    /// Longitude of the end point
    end_lon: f64,

    /// Path to the graph snapshot, created after the first download
    #[arg(long, default_value = "giang_vo_ba_dinh.json")]
    snapshot: PathBuf,

    /// Place whose street network is routed
    #[arg(long, default_value = wardnav::DEFAULT_PLACE)]
    place: String,

    /// Administrative area scoping road-name lookups
    #[arg(long, default_value = "Hà Nội")]
    area: String,

    /// Build the graph from a local OSM extract
    /// instead of the snapshot/download path
    #[arg(long)]
    osm_file: Option<PathBuf>,

    /// Ban all ways carrying this road name (repeatable)
    #[arg(long)]
    ban: Vec<String>,

    /// Ban a specific OSM way id (repeatable)
    #[arg(long)]
    ban_id: Vec<i64>,

    /// Skip the service-area boundary check on the endpoints
    #[arg(long)]
    no_boundary: bool,
}

pub fn main() -> Result<(), Box<dyn Error>> {
    colog::init();
    let cli = Cli::parse();

    let client = OverpassClient::new(&cli.area)?;
    let graph = match &cli.osm_file {
        Some(path) => load_from_osm_file(path)?,
        None => load_or_download(&cli.snapshot, &cli.place, &client)?,
    };
    let area = if cli.no_boundary {
        ServiceArea::unbounded()
    } else {
        ServiceArea::fetch(&cli.place)
    };

    let mut planner = Planner::new(graph, client, area);
    planner.ban_segment(cli.ban_id.iter().copied());
    for name in &cli.ban {
        let banned = planner.ban_by_name(name);
        log::info!("banned {banned} way(s) named {name:?}");
    }

    for (lat, lon) in [
        (cli.start_lat, cli.start_lon),
        (cli.end_lat, cli.end_lon),
    ] {
        match planner.set_endpoint(lat, lon) {
            EndpointStatus::Accepted => {}
            EndpointStatus::OutsideServiceArea => {
                return Err(format!("point {lat}, {lon} lies outside {}", cli.place).into());
            }
            EndpointStatus::AlreadySet => unreachable!("only two endpoints are ever set"),
        }
    }

    match planner.compute_route()? {
        Some(route) => print_route(planner.graph(), &route),
        None => println!("No route found. Clear some bans or pick different points."),
    }

    Ok(())
}

fn print_route(g: &Graph, route: &RouteSummary) {
    for (i, instruction) in route.instructions.iter().enumerate() {
        println!("{}. {}", i + 1, instruction);
    }
    println!("Total distance: {:.2} km", route.total_distance_m / 1000.0);

    let coordinates: Vec<[f64; 2]> = route
        .nodes
        .iter()
        .filter_map(|&node_id| g.get_node(node_id))
        .map(|node| [node.lon, node.lat])
        .collect();
    let geojson = serde_json::json!({
        "type": "FeatureCollection",
        "features": [{
            "type": "Feature",
            "properties": {},
            "geometry": {
                "type": "LineString",
                "coordinates": coordinates,
            },
        }],
    });
    println!("{geojson:#}");
}
