//! Timoshenko, truss and cable members, and input validation

use std::f64::consts::SQRT_2;
use std::sync::Arc;

use approx::assert_relative_eq;
use frame_solver::prelude::*;

fn two_bar(kind: ElementKind, apex: [f64; 2]) -> (StructuralSystem, [Arc<Element>; 2]) {
    let section = Arc::new(Section::circle(0.01));
    let bar = |start: [f64; 2]| {
        Arc::new(
            Element::new(kind, start, apex)
                .unwrap()
                .with_material(Material::steel())
                .with_section(Arc::clone(&section)),
        )
    };
    let bars = [bar([0.0, 0.0]), bar([2.0, 0.0])];

    let mut system = StructuralSystem::new();
    for b in &bars {
        system.add_element(b).unwrap();
    }
    system
        .add_boundary_condition(BoundaryCondition::pinned([0.0, 0.0]))
        .unwrap();
    system
        .add_boundary_condition(BoundaryCondition::pinned([2.0, 0.0]))
        .unwrap();
    (system, bars)
}

#[test]
fn test_timoshenko_adds_shear_deflection() {
    let (p, l) = (-10e3, 1.0);
    let material = Material::steel();
    let section = Section::rectangle(0.1, 0.3);
    let kappa = section.shear_coefficient(material.nu);

    let beam = Arc::new(
        Element::timoshenko([0.0, 0.0], [l, 0.0])
            .unwrap()
            .with_material(material.clone())
            .with_section(section.clone()),
    );
    let mut system = StructuralSystem::new();
    system.add_element(&beam).unwrap();
    system
        .add_boundary_condition(BoundaryCondition::fixed([0.0, 0.0]))
        .unwrap();
    system.add_load([l, 0.0], [(LoadComponent::Fy, p)]).unwrap();
    system.run().unwrap();

    let bending = p * l.powi(3) / (3.0 * material.e * section.iz);
    let shear = p * l / (kappa * material.g * section.a);
    let tip = system.node_displacement([l, 0.0]).unwrap();
    assert_relative_eq!(tip.uy, bending + shear, max_relative = 1e-9);
    assert_relative_eq!(
        tip.tz,
        p * l.powi(2) / (2.0 * material.e * section.iz),
        max_relative = 1e-9
    );
}

#[test]
fn test_timoshenko_approaches_euler_bernoulli_when_slender() {
    let tip = |kind: ElementKind| {
        let beam = Arc::new(
            Element::new(kind, [0.0, 0.0], [50.0, 0.0])
                .unwrap()
                .with_material(Material::steel())
                .with_section(Section::square(0.1)),
        );
        let mut system = StructuralSystem::new();
        system.add_element(&beam).unwrap();
        system
            .add_boundary_condition(BoundaryCondition::fixed([0.0, 0.0]))
            .unwrap();
        system.add_load([50.0, 0.0], [(LoadComponent::Fy, -1.0)]).unwrap();
        system.run().unwrap();
        system.node_displacement([50.0, 0.0]).unwrap().uy
    };

    assert_relative_eq!(
        tip(ElementKind::Timoshenko),
        tip(ElementKind::EulerBernoulli),
        max_relative = 1e-4
    );
}

#[test]
fn test_two_bar_truss() {
    let p = 1e3;
    let (mut system, bars) = two_bar(ElementKind::Truss, [1.0, 1.0]);
    system.add_load([1.0, 1.0], [(LoadComponent::Fy, -p)]).unwrap();
    let solution = system.run().unwrap();
    assert_eq!(solution.frame_type, FrameType::Plane);
    assert_eq!(solution.free_dofs, 2);

    let (material, section) = bars[0].properties().unwrap();
    let ea = material.e * section.a;
    let apex = system.node_displacement([1.0, 1.0]).unwrap();
    assert_relative_eq!(apex.uy, -SQRT_2 * p / ea, max_relative = 1e-9);
    assert!(apex.ux.abs() < 1e-12);
    assert_eq!(apex.tz, 0.0);

    for bar in &bars {
        let forces = system.element_forces(bar).unwrap();
        assert_eq!(forces.len(), 1);
        assert_relative_eq!(forces[0].start().axial, -p / SQRT_2, max_relative = 1e-9);
        assert_relative_eq!(forces[0].end().axial, -p / SQRT_2, max_relative = 1e-9);
        assert_eq!(forces[0].start().moment_z, 0.0);
    }
}

#[test]
fn test_hanging_cable_in_tension() {
    let p = 1e3;
    let (mut system, bars) = two_bar(ElementKind::Cable, [1.0, -1.0]);
    system.add_load([1.0, -1.0], [(LoadComponent::Fy, -p)]).unwrap();
    system.run().unwrap();

    for bar in &bars {
        let forces = system.element_forces(bar).unwrap();
        assert_relative_eq!(forces[0].start().axial, p / SQRT_2, max_relative = 1e-9);
    }
    let r = system.reaction([0.0, 0.0]).unwrap();
    assert_relative_eq!(r.fy, p / 2.0, max_relative = 1e-9);
    assert_relative_eq!(r.fx, -p / 2.0, max_relative = 1e-9);
}

#[test]
fn test_moment_at_truss_joint_goes_to_support() {
    let (mut system, _) = two_bar(ElementKind::Truss, [1.0, 1.0]);
    system
        .add_load([1.0, 1.0], [(LoadComponent::Mz, 5.0), (LoadComponent::Fx, 1.0)])
        .unwrap();
    system.run().unwrap();

    // Bars give the joint no rotational stiffness, so its rotation is held
    let r = system.reaction([1.0, 1.0]).unwrap();
    assert_relative_eq!(r.mz, -5.0, max_relative = 1e-9);
    assert_eq!(r.fx, 0.0);
    assert_eq!(system.node_displacement([1.0, 1.0]).unwrap().tz, 0.0);
}

#[test]
fn test_enforced_displacement() {
    let beam = Arc::new(
        Element::euler_bernoulli([0.0, 0.0], [2.0, 0.0])
            .unwrap()
            .with_material(Material::steel())
            .with_section(Section::square(0.1)),
    );
    let mut system = StructuralSystem::new();
    system.add_element(&beam).unwrap();
    system
        .add_boundary_condition(BoundaryCondition::fixed([0.0, 0.0]))
        .unwrap();
    system.add_bc([2.0, 0.0], [(Dof::Uy, -0.01)]).unwrap();
    system.run().unwrap();

    let (material, section) = beam.properties().unwrap();
    let stiffness = 3.0 * material.e * section.iz / 8.0;
    let tip = system.node_displacement([2.0, 0.0]).unwrap();
    assert_eq!(tip.uy, -0.01);
    assert_relative_eq!(tip.tz, -1.5 * 0.01 / 2.0, max_relative = 1e-9);

    let r = system.reaction([2.0, 0.0]).unwrap();
    assert_relative_eq!(r.fy, -0.01 * stiffness, max_relative = 1e-9);
}

#[test]
fn test_invalid_inputs() {
    assert!(matches!(
        Element::euler_bernoulli([1.0, 1.0], [1.0, 1.0]),
        Err(StructuralError::Geometry(_))
    ));
    assert!(matches!(
        Element::euler_bernoulli([0.0, 0.0], [1.0, 0.0])
            .unwrap()
            .with_v([2.0, 0.0, 0.0]),
        Err(StructuralError::Geometry(_))
    ));

    let beam = Arc::new(
        Element::euler_bernoulli([0.0, 0.0], [1.0, 0.0])
            .unwrap()
            .with_material(Material::steel())
            .with_section(Section::square(0.1)),
    );
    assert!(matches!(beam.path(1.5), Err(StructuralError::Domain(_))));

    let mut system = StructuralSystem::new();
    system.add_element(&beam).unwrap();
    assert!(matches!(
        system.add_dist_load(&beam, &[0.0], [(LoadComponent::Fy, [1.0])]),
        Err(StructuralError::DimensionMismatch { expected: 2, found: 1 })
    ));
    assert!(matches!(
        system.add_dist_load(&beam, &[0.0, 1.2], [(LoadComponent::Fy, [1.0, 1.0])]),
        Err(StructuralError::Domain(_))
    ));
    assert!(matches!(
        system.add_dist_load(&beam, &[0.5, 0.2], [(LoadComponent::Fy, [1.0, 1.0])]),
        Err(StructuralError::InvalidInput(_))
    ));
    assert!(matches!(
        system.add_dist_load(&beam, &[0.0, 1.0], [(LoadComponent::Fy, [1.0, 1.0, 1.0])]),
        Err(StructuralError::DimensionMismatch { expected: 2, found: 3 })
    ));
    assert!(matches!(
        system.node_displacement([0.0, 0.0]),
        Err(StructuralError::NotAnalyzed)
    ));
    assert!("Rz".parse::<Dof>().is_err());
    assert_eq!("tz".parse::<Dof>().unwrap(), Dof::Tz);
}
