// Dynamic filter schema: which attribute controls the frontend renders per
// category, and which second-level controls appear once a specific
// component is picked. Built once at startup and carried in the app state;
// the constraint filter never consults it, it blindly applies whatever
// attribute keys the criteria carry, so the two must stay in sync through
// this table.

use serde::Serialize;
use std::collections::HashMap;

#[derive(Debug, Serialize, Clone)]
pub struct AttributeDef {
    pub key: &'static str,
    pub label: &'static str,
    pub options: Vec<&'static str>,
}

impl AttributeDef {
    fn new(key: &'static str, label: &'static str, options: Vec<&'static str>) -> Self {
        Self { key, label, options }
    }
}

#[derive(Debug)]
pub struct AttributeSchema {
    categories: HashMap<&'static str, Vec<AttributeDef>>,
    components: HashMap<&'static str, Vec<AttributeDef>>,
}

impl AttributeSchema {
    /// First-level filters for a category, or None for categories the
    /// schema does not recognize (those products simply skip dynamic
    /// filtering).
    pub fn category_attributes(&self, category: &str) -> Option<&[AttributeDef]> {
        self.categories.get(category).map(Vec::as_slice)
    }

    /// Second-level filters unlocked by a selected `component` value.
    pub fn component_attributes(&self, component: &str) -> Option<&[AttributeDef]> {
        self.components.get(component).map(Vec::as_slice)
    }

    pub fn category_names(&self) -> Vec<&'static str> {
        let mut names: Vec<&'static str> = self.categories.keys().copied().collect();
        names.sort_unstable();
        names
    }

    /// The full filter universe shipped with the app.
    pub fn builtin() -> Self {
        let mut categories = HashMap::new();
        categories.insert(
            "Freios",
            vec![
                AttributeDef::new(
                    "component",
                    "Componente",
                    vec!["Pastilha", "Disco", "Lona", "Tambor", "Fluido"],
                ),
                AttributeDef::new("side", "Eixo", vec!["Dianteira", "Traseira", "Ambos"]),
            ],
        );
        categories.insert(
            "Suspensão",
            vec![
                AttributeDef::new(
                    "component",
                    "Componente",
                    vec!["Amortecedor", "Mola", "Batente", "Bandeja", "Pivô"],
                ),
                AttributeDef::new("position", "Posição", vec!["Dianteira", "Traseira", "Ambos"]),
            ],
        );
        categories.insert(
            "Motor",
            vec![
                AttributeDef::new(
                    "component",
                    "Componente",
                    vec!["Correia", "Vela", "Bomba de Óleo", "Junta", "Pistão"],
                ),
                AttributeDef::new("engine", "Motorização", vec!["1.0", "1.4", "1.6", "1.8", "2.0"]),
            ],
        );
        categories.insert(
            "Filtros",
            vec![
                AttributeDef::new(
                    "component",
                    "Tipo",
                    vec!["Filtro de Ar", "Filtro de Óleo", "Filtro de Combustível", "Filtro de Cabine"],
                ),
            ],
        );
        categories.insert(
            "Elétrica",
            vec![
                AttributeDef::new(
                    "component",
                    "Componente",
                    vec!["Bateria", "Alternador", "Motor de Partida", "Bobina"],
                ),
                AttributeDef::new("voltage", "Voltagem", vec!["12V", "24V"]),
            ],
        );
        categories.insert(
            "Iluminação",
            vec![
                AttributeDef::new(
                    "component",
                    "Componente",
                    vec!["Farol", "Lanterna", "Lâmpada", "Milha"],
                ),
                AttributeDef::new("side", "Lado", vec!["Dianteira", "Traseira", "Ambos"]),
            ],
        );
        categories.insert(
            "Arrefecimento",
            vec![
                AttributeDef::new(
                    "component",
                    "Componente",
                    vec!["Radiador", "Bomba d'Água", "Válvula Termostática", "Eletroventilador"],
                ),
            ],
        );
        categories.insert(
            "Transmissão",
            vec![
                AttributeDef::new(
                    "component",
                    "Componente",
                    vec!["Embreagem", "Cabo de Embreagem", "Coxim", "Trizeta"],
                ),
                AttributeDef::new("gearbox", "Câmbio", vec!["Manual", "Automático"]),
            ],
        );

        let mut components = HashMap::new();
        components.insert(
            "Pastilha",
            vec![AttributeDef::new(
                "material",
                "Material",
                vec!["Cerâmica", "Semimetálica", "Orgânica"],
            )],
        );
        components.insert(
            "Disco",
            vec![AttributeDef::new(
                "ventilation",
                "Ventilação",
                vec!["Ventilado", "Sólido"],
            )],
        );
        components.insert(
            "Amortecedor",
            vec![AttributeDef::new(
                "gas_type",
                "Tipo",
                vec!["Pressurizado", "Convencional"],
            )],
        );
        components.insert(
            "Vela",
            vec![AttributeDef::new(
                "electrode",
                "Eletrodo",
                vec!["Níquel", "Platina", "Irídio"],
            )],
        );
        components.insert(
            "Correia",
            vec![AttributeDef::new(
                "belt_kind",
                "Aplicação",
                vec!["Dentada", "Poly-V", "Acessórios"],
            )],
        );
        components.insert(
            "Bateria",
            vec![AttributeDef::new(
                "capacity",
                "Capacidade",
                vec!["40Ah", "50Ah", "60Ah", "70Ah"],
            )],
        );
        components.insert(
            "Lâmpada",
            vec![AttributeDef::new(
                "bulb_kind",
                "Tecnologia",
                vec!["Halógena", "LED", "Xenon"],
            )],
        );
        components.insert(
            "Embreagem",
            vec![AttributeDef::new(
                "kit",
                "Conjunto",
                vec!["Kit Completo", "Platô", "Disco", "Atuador"],
            )],
        );

        Self {
            categories,
            components,
        }
    }
}
