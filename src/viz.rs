//! Minimal visualization dump (spec.md §6: "one polygonal-mesh file per
//! cycle, containing the active overlap polygons").
//!
//! Deliberately does not depend on a mesh-file-format crate: output
//! dumping is explicitly out of scope (spec.md §1) beyond providing the
//! hook itself. The format is a flat polygon-soup text file, one overlap
//! polygon per line, `x0 y0 z0 x1 y1 z1 ...`.

use std::io::{self, Write};
use std::path::Path;

use crate::contact_plane::ContactPlane;

pub fn write_cycle_dump(dir: &Path, cycle: u64, planes: &[ContactPlane]) -> io::Result<()> {
    std::fs::create_dir_all(dir)?;
    let path = dir.join(format!("contact_cycle_{cycle:08}.polysoup"));
    let mut file = std::fs::File::create(path)?;

    for plane in planes {
        let mut line = String::new();
        for v in &plane.overlap_global {
            line.push_str(&format!("{} {} {} ", v.x, v.y, v.z));
        }
        writeln!(file, "{}", line.trim_end())?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read as _;

    #[test]
    fn writes_one_line_per_plane() {
        let tmp = std::env::temp_dir().join("contact_mechanics_viz_test");
        let _ = std::fs::remove_dir_all(&tmp);

        let plane = ContactPlane {
            f1: 0,
            f2: 0,
            origin: nalgebra::Vector3::zeros(),
            normal: nalgebra::Vector3::new(0.0, 0.0, 1.0),
            e1: nalgebra::Vector3::new(1.0, 0.0, 0.0),
            e2: nalgebra::Vector3::new(0.0, 1.0, 0.0),
            overlap_local: vec![],
            overlap_global: vec![nalgebra::Vector3::new(0.0, 0.0, 0.0), nalgebra::Vector3::new(1.0, 0.0, 0.0)],
            overlap_area: 1.0,
            overlap_centroid: nalgebra::Vector3::zeros(),
            c_on_f1: nalgebra::Vector3::zeros(),
            c_on_f2: nalgebra::Vector3::zeros(),
            gap: -0.1,
            in_contact: true,
            face1_local: vec![],
            face2_local: vec![],
        };

        write_cycle_dump(&tmp, 3, std::slice::from_ref(&plane)).unwrap();
        let mut contents = String::new();
        std::fs::File::open(tmp.join("contact_cycle_00000003.polysoup"))
            .unwrap()
            .read_to_string(&mut contents)
            .unwrap();
        assert_eq!(contents.lines().count(), 1);

        let _ = std::fs::remove_dir_all(&tmp);
    }
}
