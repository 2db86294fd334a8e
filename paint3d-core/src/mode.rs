/// Render modes and the per-stage behaviour each one selects
use std::fmt;
use std::str::FromStr;

/// How a visible face reaches the surface
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Primitive {
    Points,
    Outline,
    Fill,
}

/// Render modes in increasing order of cost.
///
/// Later modes keep the behaviour of earlier ones: everything from
/// `WireframeCulled` on culls back faces, everything from `Solid` on fills,
/// and `SolidShaded` also lights.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RenderMode {
    PointCloud,
    WireframeFull,
    WireframeCulled,
    Solid,
    #[default]
    SolidShaded,
}

impl RenderMode {
    pub const ALL: [RenderMode; 5] = [
        RenderMode::PointCloud,
        RenderMode::WireframeFull,
        RenderMode::WireframeCulled,
        RenderMode::Solid,
        RenderMode::SolidShaded,
    ];

    /// The following mode, wrapping back to the first
    pub fn next(self) -> Self {
        let index = Self::ALL.iter().position(|m| *m == self).unwrap_or(0);
        Self::ALL[(index + 1) % Self::ALL.len()]
    }

    pub fn culls_back_faces(self) -> bool {
        self >= RenderMode::WireframeCulled
    }

    pub fn fills(self) -> bool {
        self >= RenderMode::Solid
    }

    pub fn shades(self) -> bool {
        self >= RenderMode::SolidShaded
    }

    pub fn primitive(self) -> Primitive {
        match self {
            RenderMode::PointCloud => Primitive::Points,
            RenderMode::WireframeFull | RenderMode::WireframeCulled => Primitive::Outline,
            RenderMode::Solid | RenderMode::SolidShaded => Primitive::Fill,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            RenderMode::PointCloud => "point-cloud",
            RenderMode::WireframeFull => "wireframe-full",
            RenderMode::WireframeCulled => "wireframe-culled",
            RenderMode::Solid => "solid",
            RenderMode::SolidShaded => "solid-shaded",
        }
    }
}

impl fmt::Display for RenderMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for RenderMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|m| m.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| {
                let names: Vec<_> = Self::ALL.iter().map(|m| m.name()).collect();
                format!("unknown render mode '{}', expected one of: {}", s, names.join(", "))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_next_cycles_through_every_mode() {
        let mut mode = RenderMode::PointCloud;
        let mut seen = Vec::new();
        for _ in 0..RenderMode::ALL.len() {
            seen.push(mode);
            mode = mode.next();
        }
        assert_eq!(seen, RenderMode::ALL.to_vec());
        assert_eq!(mode, RenderMode::PointCloud);
    }

    #[test]
    fn test_behaviour_table() {
        use RenderMode::*;
        let table = [
            (PointCloud, false, false, false, Primitive::Points),
            (WireframeFull, false, false, false, Primitive::Outline),
            (WireframeCulled, true, false, false, Primitive::Outline),
            (Solid, true, true, false, Primitive::Fill),
            (SolidShaded, true, true, true, Primitive::Fill),
        ];
        for (mode, culls, fills, shades, primitive) in table {
            assert_eq!(mode.culls_back_faces(), culls, "{mode}");
            assert_eq!(mode.fills(), fills, "{mode}");
            assert_eq!(mode.shades(), shades, "{mode}");
            assert_eq!(mode.primitive(), primitive, "{mode}");
        }
    }

    #[test]
    fn test_parse_names() {
        for mode in RenderMode::ALL {
            assert_eq!(mode.to_string().parse::<RenderMode>(), Ok(mode));
        }
        assert_eq!("SOLID".parse::<RenderMode>(), Ok(RenderMode::Solid));
        assert!("flat".parse::<RenderMode>().is_err());
    }
}
