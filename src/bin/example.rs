//! Frame Solver Example - Portal frame with a distributed roof load

use std::sync::Arc;

use anyhow::{Context, Result};
use frame_solver::prelude::*;
use log::info;

fn main() -> Result<()> {
    env_logger::init();

    println!("=== Frame Solver Example: Portal Frame ===\n");

    // Create a simple portal frame
    //
    //     B -----*----- C      * = 15 kN lateral load at B,
    //     |            |           20 kN/m on the beam
    //     |            |
    //     A            D
    //     ^            ^
    //   Fixed       Fixed
    //
    let height = 4.0; // 4m column height
    let span = 6.0; // 6m beam span

    let steel = Arc::new(Material::steel());
    let column = Arc::new(Section::rectangle(0.3, 0.3));
    let girder = Arc::new(Section::rectangle(0.3, 0.5));

    let make = |start: [f64; 2], end: [f64; 2], section: &Arc<Section>| -> Result<Arc<Element>> {
        Ok(Arc::new(
            Element::euler_bernoulli(start, end)?
                .with_material(Arc::clone(&steel))
                .with_section(Arc::clone(section)),
        ))
    };

    let left = make([0.0, 0.0], [0.0, height], &column)?;
    let beam = make([0.0, height], [span, height], &girder)?;
    let right = make([span, height], [span, 0.0], &column)?;

    let mut system = StructuralSystem::with_options(
        AnalysisOptions::default().with_load_reduction(LoadReduction::Consistent),
    );
    for element in [&left, &beam, &right] {
        system.add_element(element)?;
    }

    // Fixed supports at base
    system.add_boundary_condition(BoundaryCondition::fixed([0.0, 0.0]))?;
    system.add_boundary_condition(BoundaryCondition::fixed([span, 0.0]))?;

    // 20 kN/m on the beam (negative Y = downward), 15 kN wind at the roof
    system.add_dist_load(&beam, &[0.0, 1.0], [(LoadComponent::Fy, [-20e3, -20e3])])?;
    system.add_load([0.0, height], [(LoadComponent::Fx, 15e3)])?;

    info!("Running linear analysis");
    let solution = system.run().context("analysis failed")?;
    println!("Frame type: {:?}\n", solution.frame_type);

    println!("Node Displacements:");
    for (node, (coords, disp)) in solution
        .nodes
        .iter()
        .zip(&solution.displacements)
        .enumerate()
    {
        println!(
            "  N{} ({:.1}, {:.1}): UX={:.4}mm, UY={:.4}mm, TZ={:.6}rad",
            node,
            coords[0],
            coords[1],
            disp[0] * 1000.0,
            disp[1] * 1000.0,
            disp[5]
        );
    }

    println!("\nSupport Reactions:");
    for point in [[0.0, 0.0], [span, 0.0]] {
        let rxn = system.reaction(point)?;
        println!(
            "  ({:.1}, {:.1}): FX={:.2}kN, FY={:.2}kN, MZ={:.2}kN·m",
            point[0],
            point[1],
            rxn.fx / 1000.0,
            rxn.fy / 1000.0,
            rxn.mz / 1000.0
        );
    }

    println!("\nElement Forces:");
    for (name, element) in [("Left", &left), ("Beam", &beam), ("Right", &right)] {
        for segment in system.element_forces(element)? {
            let (i, j) = (segment.start(), segment.end());
            println!(
                "  {} t={:.2}..{:.2}: P={:.2}kN, Vmax={:.2}kN, Mmax={:.2}kN·m",
                name,
                segment.t[0],
                segment.t[1],
                i.axial / 1000.0,
                i.shear_y.abs().max(j.shear_y.abs()) / 1000.0,
                i.moment_z.abs().max(j.moment_z.abs()) / 1000.0
            );
        }
    }

    let summary = system.summary()?;
    println!("\nSummary:");
    println!("  Max displacement: {:.4}mm at N{}", summary.max_displacement * 1000.0, summary.max_disp_node);
    println!("  Max reaction: {:.2}kN at N{}", summary.max_reaction / 1000.0, summary.max_reaction_node);
    println!("  Max axial: {:.2}kN in element {}", summary.max_axial / 1000.0, summary.max_axial_element);
    println!("  Max moment: {:.2}kN·m in element {}", summary.max_moment / 1000.0, summary.max_moment_element);

    let json = system
        .solution()
        .context("solution missing after run")?
        .to_json()?;
    println!("\n=== Solution JSON ===\n{}", json);

    Ok(())
}
