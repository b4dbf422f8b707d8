use ndarray::Array2;
use verlet::{cubic_lattice, compute_forces, compute_interaction_energy};
use verlet::{Masses, NeighborList, Potential};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let backend = std::env::args().nth(1).unwrap_or_else(|| "grid".into());

    // enable collection of profiling data
    time_graph::enable_data_collection(true);
    // clear any existing collected data
    time_graph::clear_collected_data();

    // run the calculation
    let energy = run(&backend)?;
    println!("energy = {}", energy);

    // get the call graph and display it
    let graph = time_graph::get_full_graph();
    // (this requires the "table" feature for the time_graph crate)
    println!("{}", graph.as_short_table());

    // also available for saving profiling data to the disk & future analysis
    // (this requires the "json" feature for the time_graph crate)
    println!("{}", graph.as_json());

    Ok(())
}

/// Build the neighbor list for a few configurations of particles, and
/// evaluate the Lennard-Jones forces and energy on each of them
fn run(backend: &str) -> Result<f64, Box<dyn std::error::Error>> {
    let mut positions = cubic_lattice([20, 20, 20], 1.1);
    let mut accelerations = Array2::zeros(positions.raw_dim());

    let potential = Potential::new("lennard_jones", r#"{"epsilon": 0.25, "sigma": 1.0}"#)?;
    let mut list = NeighborList::new(backend, r#"{"cutoff": 2.5}"#)?;

    let mut energy = 0.0;
    time_graph::spanned!("Full calculation", {
        for step in 0..10 {
            for (i, value) in positions.iter_mut().enumerate() {
                *value += 0.01 * f64::sin((step * i) as f64);
            }

            let linear = list.build(positions.view())?;

            accelerations.fill(0.0);
            compute_forces(positions.view(), accelerations.view_mut(), Masses::Uniform(1.0), linear, &potential)?;
            energy = compute_interaction_energy(positions.view(), linear, &potential)?;
        }
    });

    Ok(energy)
}
