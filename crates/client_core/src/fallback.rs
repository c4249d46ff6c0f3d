//! Static exhibitor catalog served when the backend is unreachable or empty.

use shared::domain::{
    Address, Director, ExhibitorId, ExhibitorRecord, FundingInfo, Product, ProductId, RevenueInfo,
    Spoc,
};

const BANNER_URL: &str =
    "https://res.cloudinary.com/dng61q3lg/image/upload/v1753780471/bannerAgri_mrsukk.jpg";
const LOGO_URL: &str =
    "https://res.cloudinary.com/dng61q3lg/image/upload/v1753555568/rtnm_zk88ke.png";

struct Stall {
    id: i64,
    name: &'static str,
    website: &'static str,
    pitch_deck: &'static str,
    cert: &'static str,
    street: &'static str,
    city: &'static str,
    state: &'static str,
    pincode: &'static str,
    director: (&'static str, &'static str),
    spoc: (&'static str, &'static str, &'static str, &'static str),
    revenue: (&'static str, u64),
    funding: &'static str,
    products: &'static [(i64, &'static str, &'static str)],
}

const STALLS: &[Stall] = &[
    Stall {
        id: 1,
        name: "TechCorp Solutions",
        website: "https://techcorp.example.com",
        pitch_deck: "https://example.com/pitch.pdf",
        cert: "DPIIT123456",
        street: "Tech Park, Sector 5, Electronic City",
        city: "Bangalore",
        state: "Karnataka",
        pincode: "560100",
        director: ("John Smith", "john.smith@techcorp.com"),
        spoc: (
            "Sarah Johnson",
            "sarah.johnson@techcorp.com",
            "+91-9876543210",
            "Business Development Manager",
        ),
        revenue: ("₹1Cr–₹10Cr", 50_000),
        funding: "Series A",
        products: &[
            (
                1,
                "AI-Powered Analytics Platform",
                "Advanced analytics solution using machine learning",
            ),
            (
                2,
                "Cloud Infrastructure Service",
                "Scalable cloud solutions for enterprises",
            ),
        ],
    },
    Stall {
        id: 2,
        name: "InnovateLab",
        website: "https://innovatelab.example.com",
        pitch_deck: "https://example.com/pitch2.pdf",
        cert: "DPIIT789012",
        street: "Innovation Hub, Cyber City",
        city: "Gurgaon",
        state: "Haryana",
        pincode: "122002",
        director: ("Priya Patel", "priya.patel@innovatelab.com"),
        spoc: (
            "Rahul Kumar",
            "rahul.kumar@innovatelab.com",
            "+91-9876543211",
            "Technical Lead",
        ),
        revenue: ("₹25L–₹1Cr", 25_000),
        funding: "Bootstrapped",
        products: &[(
            3,
            "IoT Monitoring System",
            "Real-time monitoring solution for industrial equipment",
        )],
    },
    Stall {
        id: 3,
        name: "GreenTech Innovations",
        website: "https://greentech.example.com",
        pitch_deck: "https://example.com/pitch3.pdf",
        cert: "DPIIT345678",
        street: "Green Valley, IT Corridor",
        city: "Chennai",
        state: "Tamil Nadu",
        pincode: "600032",
        director: ("Amit Sharma", "amit.sharma@greentech.com"),
        spoc: (
            "Neha Singh",
            "neha.singh@greentech.com",
            "+91-9876543212",
            "Product Manager",
        ),
        revenue: ("₹10Cr+", 100_000),
        funding: "Series B",
        products: &[
            (
                4,
                "Solar Energy Management",
                "Smart solar panel monitoring and optimization system",
            ),
            (
                5,
                "Waste Management Solution",
                "AI-driven waste sorting and recycling platform",
            ),
        ],
    },
];

/// The fixed fallback catalog. Never empty.
pub fn fallback_exhibitors() -> Vec<ExhibitorRecord> {
    STALLS.iter().map(Stall::to_record).collect()
}

impl Stall {
    fn to_record(&self) -> ExhibitorRecord {
        ExhibitorRecord {
            id: ExhibitorId(self.id),
            name: self.name.to_string(),
            banner: BANNER_URL.to_string(),
            logo: LOGO_URL.to_string(),
            website_url: self.website.to_string(),
            pitch_deck: self.pitch_deck.to_string(),
            certification_number: self.cert.to_string(),
            address: Some(Address {
                id: self.id,
                street: self.street.to_string(),
                city: self.city.to_string(),
                state: self.state.to_string(),
                pincode: self.pincode.to_string(),
            }),
            director: Some(Director {
                id: self.id,
                name: self.director.0.to_string(),
                email: self.director.1.to_string(),
            }),
            spoc: Some(Spoc {
                id: self.id,
                name: self.spoc.0.to_string(),
                email: self.spoc.1.to_string(),
                phone: self.spoc.2.to_string(),
                position: self.spoc.3.to_string(),
            }),
            revenue: Some(RevenueInfo {
                id: self.id,
                revenue_bracket: self.revenue.0.to_string(),
                user_impact: self.revenue.1,
            }),
            funding: Some(FundingInfo {
                id: self.id,
                funding_type: self.funding.to_string(),
            }),
            products: self
                .products
                .iter()
                .map(|&(id, title, description)| Product {
                    description: Some(description.to_string()),
                    ..Product::titled(ProductId(id), title)
                })
                .collect(),
        }
    }
}
